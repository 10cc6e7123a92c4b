//! Offset of the innermost square from the horizontal midline.
//!
//! The target field enters the image from the top: a positive distance means
//! the innermost centroid is still above the midline, a negative one that it
//! has passed it.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::candidate::SquareCandidate;
use crate::error::ConfigError;
use crate::types::{Point2D, RgbColor};

/// Qualitative range of a signed pixel distance, relative to the image
/// height `h`. Intervals are closed at their lower bound.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBand {
    /// `[0.5h, ∞)`
    TooFar,
    /// `[0.3h, 0.5h)`
    FarAway,
    /// `[0.2h, 0.3h)`
    Away,
    /// `[0.1h, 0.2h)`
    Close,
    /// `[0.05h, 0.1h)`
    Closer,
    /// `[0.01h, 0.05h)`
    VeryClose,
    /// `[0, 0.01h)`
    ExtremelyClose,
    /// `(-∞, 0)`
    Passed,
}

impl DistanceBand {
    /// Lower bounds as fractions of the image height, farthest first.
    const THRESHOLDS: [(f64, DistanceBand); 7] = [
        (0.5, DistanceBand::TooFar),
        (0.3, DistanceBand::FarAway),
        (0.2, DistanceBand::Away),
        (0.1, DistanceBand::Close),
        (0.05, DistanceBand::Closer),
        (0.01, DistanceBand::VeryClose),
        (0.0, DistanceBand::ExtremelyClose),
    ];

    pub fn classify(pixel_distance: i32, image_height: u32) -> DistanceBand {
        let d = pixel_distance as f64;
        let h = image_height as f64;
        Self::THRESHOLDS
            .iter()
            .find(|(frac, _)| d >= h * frac)
            .map_or(DistanceBand::Passed, |&(_, band)| band)
    }

    pub fn label(self) -> &'static str {
        match self {
            DistanceBand::TooFar => "too far",
            DistanceBand::FarAway => "far away",
            DistanceBand::Away => "away",
            DistanceBand::Close => "close",
            DistanceBand::Closer => "closer",
            DistanceBand::VeryClose => "very close",
            DistanceBand::ExtremelyClose => "extremely close",
            DistanceBand::Passed => "passed",
        }
    }

    /// Caption color for overlays.
    pub fn emphasis(self) -> RgbColor {
        match self {
            DistanceBand::FarAway | DistanceBand::Away => RgbColor::GREEN,
            DistanceBand::Close | DistanceBand::Closer | DistanceBand::VeryClose => {
                RgbColor::YELLOW
            }
            DistanceBand::ExtremelyClose => RgbColor::PURPLE,
            DistanceBand::Passed => RgbColor::RED,
            DistanceBand::TooFar => RgbColor::ORANGE,
        }
    }
}

impl fmt::Display for DistanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceMeasurement {
    /// `h/2 - cy`, truncated toward zero.
    pub pixel_distance: i32,
    pub real_distance_cm: f64,
    pub px_per_cm: f64,
    /// Innermost centroid the distance was measured from.
    pub centroid: Point2D,
    pub band: DistanceBand,
}

impl DistanceMeasurement {
    /// Overlay caption, e.g. `close: 3.812cm`.
    pub fn caption(&self) -> String {
        format!("{}: {:.3}cm", self.band, self.real_distance_cm)
    }
}

/// Status line: `distance: <px>px <cm>cm`.
impl fmt::Display for DistanceMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distance: {:4}px {:7.3}cm",
            self.pixel_distance, self.real_distance_cm
        )
    }
}

/// Signed offset of `centroid_y` from the midline of an image of
/// `image_height` rows.
pub fn pixel_distance(image_height: u32, centroid_y: i32) -> i32 {
    (image_height as f64 / 2.0 - centroid_y as f64) as i32
}

/// Converts pixel offsets to centimeters using the innermost square as scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceEstimator {
    physical_size_cm: f64,
}

impl DistanceEstimator {
    pub fn new(physical_size_cm: f64) -> Result<Self, ConfigError> {
        if !(physical_size_cm.is_finite() && physical_size_cm > 0.0) {
            return Err(ConfigError::InvalidPhysicalSize(physical_size_cm));
        }
        Ok(Self { physical_size_cm })
    }

    pub fn physical_size_cm(&self) -> f64 {
        self.physical_size_cm
    }

    /// Scale from the innermost square's perimeter, taking a quarter of it as
    /// the side length in pixels.
    pub fn px_per_cm(&self, perimeter: f64) -> Option<f64> {
        if !(perimeter.is_finite() && perimeter > 0.0) {
            return None;
        }
        Some(perimeter / 4.0 / self.physical_size_cm)
    }

    pub fn real_distance_cm(&self, pixel_distance: i32, perimeter: f64) -> Option<f64> {
        self.px_per_cm(perimeter)
            .map(|scale| pixel_distance as f64 / scale)
    }

    /// Measure the innermost square; `None` for a degenerate perimeter or a
    /// centroid that is undefined or lies on the first row or column.
    pub fn estimate(
        &self,
        innermost: &SquareCandidate,
        image_height: u32,
    ) -> Option<DistanceMeasurement> {
        let centroid = innermost.centroid;
        if centroid.x <= 0 || centroid.y <= 0 {
            debug!(
                "contour {} has centroid ({}, {}), skipping distance",
                innermost.index, centroid.x, centroid.y
            );
            return None;
        }
        let Some(px_per_cm) = self.px_per_cm(innermost.perimeter) else {
            debug!(
                "contour {} has perimeter {}, skipping distance",
                innermost.index, innermost.perimeter
            );
            return None;
        };

        let pixel_distance = pixel_distance(image_height, innermost.centroid.y);
        Some(DistanceMeasurement {
            pixel_distance,
            real_distance_cm: pixel_distance as f64 / px_per_cm,
            px_per_cm,
            centroid: innermost.centroid,
            band: DistanceBand::classify(pixel_distance, image_height),
        })
    }
}
