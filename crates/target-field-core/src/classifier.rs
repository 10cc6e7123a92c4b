//! Role assignment among validated square candidates.
//!
//! Two strategies share the [`SquareClassifier`] contract:
//! - [`AreaExtremesClassifier`] (default): smallest area is the innermost
//!   square, largest area the outermost; the contour hierarchy only serves as
//!   a consistency check.
//! - [`HierarchyClassifier`]: the innermost square must be a leaf with a
//!   parent, the outermost must have a child.
//!
//! Both break ties by the lowest position in detection order.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::candidate::SquareCandidate;
use crate::types::RgbColor;

/// Selects a classifier implementation from configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    AreaExtremes,
    Hierarchy,
}

impl ClassifierKind {
    pub fn build(self) -> Box<dyn SquareClassifier + Send + Sync> {
        match self {
            ClassifierKind::AreaExtremes => Box::new(AreaExtremesClassifier),
            ClassifierKind::Hierarchy => Box::new(HierarchyClassifier),
        }
    }
}

pub trait SquareClassifier {
    /// Assign roles to `candidates`, which are in detection order.
    fn classify(&self, candidates: &[SquareCandidate]) -> ClassificationResult;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquareRole {
    Innermost,
    Outermost,
    Other,
}

impl SquareRole {
    /// Overlay color for this role.
    pub fn emphasis(self) -> RgbColor {
        match self {
            SquareRole::Innermost => RgbColor::BLUE,
            SquareRole::Outermost => RgbColor::RED,
            SquareRole::Other => RgbColor::GREEN,
        }
    }
}

/// Hierarchy facts that contradict the area-based role choice.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HierarchyAnomaly {
    /// The smallest square still contains another contour.
    InnermostHasChild { index: usize },
    /// The largest square contains nothing.
    OutermostHasNoChild { index: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub innermost: Option<SquareCandidate>,
    pub outermost: Option<SquareCandidate>,
    pub others: Vec<SquareCandidate>,
    pub anomalies: Vec<HierarchyAnomaly>,
}

impl ClassificationResult {
    /// Split `candidates` by position: the chosen positions become the two
    /// roles, every other position goes to `others`.
    pub fn from_positions(
        candidates: &[SquareCandidate],
        innermost: Option<usize>,
        outermost: Option<usize>,
    ) -> Self {
        let others = candidates
            .iter()
            .enumerate()
            .filter(|&(pos, _)| Some(pos) != innermost && Some(pos) != outermost)
            .map(|(_, c)| c.clone())
            .collect();
        Self {
            innermost: innermost.and_then(|pos| candidates.get(pos).cloned()),
            outermost: outermost.and_then(|pos| candidates.get(pos).cloned()),
            others,
            anomalies: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.innermost.is_none() && self.outermost.is_none() && self.others.is_empty()
    }

    /// Candidates with their roles in drawing order: outermost, others,
    /// innermost last so it stays on top.
    pub fn roles(&self) -> impl Iterator<Item = (SquareRole, &SquareCandidate)> {
        self.outermost
            .iter()
            .map(|c| (SquareRole::Outermost, c))
            .chain(self.others.iter().map(|c| (SquareRole::Other, c)))
            .chain(self.innermost.iter().map(|c| (SquareRole::Innermost, c)))
    }
}

/// Default classifier: area extremes with a hierarchy sanity check.
#[derive(Clone, Copy, Debug, Default)]
pub struct AreaExtremesClassifier;

impl SquareClassifier for AreaExtremesClassifier {
    fn classify(&self, candidates: &[SquareCandidate]) -> ClassificationResult {
        let innermost = position_of_extreme(candidates, |_| true, |a, b| a < b);
        let outermost = position_of_extreme(candidates, |_| true, |a, b| a > b);

        let mut result = ClassificationResult::from_positions(candidates, innermost, outermost);
        if innermost != outermost {
            result.anomalies = hierarchy_anomalies(&result);
            for anomaly in &result.anomalies {
                warn!("hierarchy disagrees with area classification: {anomaly:?}");
            }
        }
        result
    }
}

/// Alternative classifier driven by the nesting relation.
#[derive(Clone, Copy, Debug, Default)]
pub struct HierarchyClassifier;

impl SquareClassifier for HierarchyClassifier {
    fn classify(&self, candidates: &[SquareCandidate]) -> ClassificationResult {
        let innermost = position_of_extreme(
            candidates,
            |c| !c.link.has_child() && c.link.has_parent(),
            |a, b| a < b,
        );
        // a missing parent is not required: the image frame may be the outermost parent
        let outermost = position_of_extreme(candidates, |c| c.link.has_child(), |a, b| a > b);
        ClassificationResult::from_positions(candidates, innermost, outermost)
    }
}

/// First position (in detection order) whose area beats every earlier
/// eligible one under `better`.
fn position_of_extreme(
    candidates: &[SquareCandidate],
    eligible: impl Fn(&SquareCandidate) -> bool,
    better: impl Fn(f64, f64) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (pos, c) in candidates.iter().enumerate() {
        if !eligible(c) {
            continue;
        }
        if best.map_or(true, |(_, area)| better(c.area, area)) {
            best = Some((pos, c.area));
        }
    }
    best.map(|(pos, _)| pos)
}

fn hierarchy_anomalies(result: &ClassificationResult) -> Vec<HierarchyAnomaly> {
    let mut out = Vec::new();
    if let Some(c) = result.innermost.as_ref().filter(|c| c.link.has_child()) {
        out.push(HierarchyAnomaly::InnermostHasChild { index: c.index });
    }
    if let Some(c) = result.outermost.as_ref().filter(|c| !c.link.has_child()) {
        out.push(HierarchyAnomaly::OutermostHasNoChild { index: c.index });
    }
    out
}
