use log::debug;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassificationResult, SquareClassifier};
use crate::distance::{DistanceEstimator, DistanceMeasurement};
use crate::error::{ConfigError, DetectError};
use crate::params::TargetFieldParams;
use crate::types::{Contour, HierarchyLink};
use crate::validator::ShapeValidator;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything detected in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetFieldDetection {
    pub image_width: u32,
    pub image_height: u32,
    /// Contours handed in, before validation.
    pub num_contours: usize,
    pub classification: ClassificationResult,
    /// `None` when no innermost square was found or its moments are degenerate.
    pub measurement: Option<DistanceMeasurement>,
}

impl TargetFieldDetection {
    pub fn status_line(&self) -> Option<String> {
        self.measurement.as_ref().map(ToString::to_string)
    }

    /// Number of contours that passed every shape gate.
    pub fn num_candidates(&self) -> usize {
        self.classification.roles().count()
    }
}

/// Validates, classifies and measures contours of one frame at a time.
///
/// Immutable after construction; share it freely between frames.
pub struct TargetFieldDetector {
    params: TargetFieldParams,
    validator: ShapeValidator,
    classifier: Box<dyn SquareClassifier + Send + Sync>,
    estimator: DistanceEstimator,
}

impl TargetFieldDetector {
    pub fn new(params: TargetFieldParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            validator: ShapeValidator::new(params.shape.clone()),
            classifier: params.classifier.build(),
            estimator: DistanceEstimator::new(params.physical_size_cm)?,
            params,
        })
    }

    /// Replace the classifier chosen by `params.classifier`.
    pub fn with_classifier(mut self, classifier: Box<dyn SquareClassifier + Send + Sync>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn params(&self) -> &TargetFieldParams {
        &self.params
    }

    pub fn estimator(&self) -> &DistanceEstimator {
        &self.estimator
    }

    /// Run the square gates, the classifier and the distance estimate over the
    /// contours of one frame. `hierarchy[i]` must describe `contours[i]`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, contours, hierarchy),
            fields(contours = contours.len(), width = image_width, height = image_height)
        )
    )]
    pub fn detect(
        &self,
        contours: &[Contour],
        hierarchy: &[HierarchyLink],
        image_width: u32,
        image_height: u32,
    ) -> Result<TargetFieldDetection, DetectError> {
        if contours.len() != hierarchy.len() {
            return Err(DetectError::HierarchyMismatch {
                contours: contours.len(),
                links: hierarchy.len(),
            });
        }
        if image_width == 0 || image_height == 0 {
            return Err(DetectError::InvalidDimensions {
                width: image_width,
                height: image_height,
            });
        }

        let candidates =
            self.validator
                .collect_candidates(contours, hierarchy, image_width, image_height);
        let classification = self.classifier.classify(&candidates);
        let measurement = classification
            .innermost
            .as_ref()
            .and_then(|inner| self.estimator.estimate(inner, image_height));

        debug!(
            "frame {}x{}: {} contours, {} squares, innermost={:?}, outermost={:?}, band={:?}",
            image_width,
            image_height,
            contours.len(),
            candidates.len(),
            classification.innermost.as_ref().map(|c| c.index),
            classification.outermost.as_ref().map(|c| c.index),
            measurement.map(|m| m.band),
        );

        Ok(TargetFieldDetection {
            image_width,
            image_height,
            num_contours: contours.len(),
            classification,
            measurement,
        })
    }
}

impl std::fmt::Debug for TargetFieldDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetFieldDetector")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierKind, HierarchyClassifier};
    use crate::distance::DistanceBand;
    use crate::geometry::tests::traced_square;
    use approx::assert_relative_eq;

    const W: u32 = 400;
    const H: u32 = 400;

    /// Three concentric squares centered at (200, 149), each the only child of
    /// the previous one.
    fn concentric() -> (Vec<Contour>, Vec<HierarchyLink>) {
        let contours = [201, 121, 61]
            .into_iter()
            .map(|side| {
                let half = (side - 1) / 2;
                Contour::new(traced_square(200 - half, 149 - half, side))
            })
            .collect();
        let links = HierarchyLink::from_parents(&[None, Some(0), Some(1)]);
        (contours, links)
    }

    #[test]
    fn detects_nested_squares() {
        let detector = TargetFieldDetector::new(TargetFieldParams::default()).expect("detector");
        let (contours, links) = concentric();
        let det = detector.detect(&contours, &links, W, H).expect("detect");

        assert_eq!(det.num_contours, 3);
        assert_eq!(det.num_candidates(), 3);
        assert_eq!(det.classification.innermost.as_ref().map(|c| c.index), Some(2));
        assert_eq!(det.classification.outermost.as_ref().map(|c| c.index), Some(0));
        assert!(det.classification.anomalies.is_empty());

        let m = det.measurement.expect("measurement");
        assert_eq!(m.pixel_distance, 51);
        assert_relative_eq!(m.px_per_cm, 10.0, epsilon = 1e-9);
        assert_relative_eq!(m.real_distance_cm, 5.1, epsilon = 1e-9);
        assert_eq!(m.band, DistanceBand::Close);
        assert_eq!(det.status_line().as_deref(), Some("distance:   51px   5.100cm"));
    }

    #[test]
    fn hierarchy_classifier_agrees_on_clean_nesting() {
        let params = TargetFieldParams {
            classifier: ClassifierKind::Hierarchy,
            ..TargetFieldParams::default()
        };
        let detector = TargetFieldDetector::new(params).expect("detector");
        let (contours, links) = concentric();
        let det = detector.detect(&contours, &links, W, H).expect("detect");
        assert_eq!(det.classification.innermost.as_ref().map(|c| c.index), Some(2));
        assert_eq!(det.classification.outermost.as_ref().map(|c| c.index), Some(0));

        let swapped = TargetFieldDetector::new(TargetFieldParams::default())
            .expect("detector")
            .with_classifier(Box::new(HierarchyClassifier));
        assert_eq!(swapped.detect(&contours, &links, W, H), Ok(det));
    }

    #[test]
    fn empty_frame_is_not_an_error() {
        let detector = TargetFieldDetector::new(TargetFieldParams::default()).expect("detector");
        let det = detector.detect(&[], &[], W, H).expect("detect");
        assert!(det.classification.is_empty());
        assert!(det.measurement.is_none());
        assert_eq!(det.status_line(), None);
    }

    #[test]
    fn rejects_malformed_frames() {
        let detector = TargetFieldDetector::new(TargetFieldParams::default()).expect("detector");
        let (contours, links) = concentric();
        assert_eq!(
            detector.detect(&contours, &links[..2], W, H),
            Err(DetectError::HierarchyMismatch {
                contours: 3,
                links: 2
            })
        );
        assert_eq!(
            detector.detect(&contours, &links, W, 0),
            Err(DetectError::InvalidDimensions {
                width: W,
                height: 0
            })
        );
    }

    #[test]
    fn construction_validates_params() {
        let params = TargetFieldParams {
            blur_kernel_size: 4,
            ..TargetFieldParams::default()
        };
        assert_eq!(
            TargetFieldDetector::new(params).unwrap_err(),
            ConfigError::InvalidBlurKernel(4)
        );
    }
}
