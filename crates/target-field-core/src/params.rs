use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierKind;
use crate::error::ConfigError;

/// Shape gates applied to every traced contour.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Lower area bound as a fraction of the image area (exclusive).
    pub min_area_ratio: f64,
    /// Upper area bound as a fraction of the image area (exclusive).
    pub max_area_ratio: f64,
    /// Lower bound on bounding-box width/height (exclusive).
    pub min_xy_ratio: f64,
    /// Upper bound on bounding-box width/height (exclusive).
    pub max_xy_ratio: f64,
    /// Douglas–Peucker epsilon as a fraction of the contour perimeter.
    pub epsilon_ratio: f64,
    /// Require the simplified polygon to have exactly four vertices.
    pub require_quadrilateral: bool,
    /// Drop contours that have a sibling on the same nesting level.
    pub reject_siblings: bool,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.005, // 0.5% of the image
            max_area_ratio: 0.75,
            min_xy_ratio: 0.75,
            max_xy_ratio: 1.25,
            epsilon_ratio: 0.1,
            require_quadrilateral: true,
            reject_siblings: true,
        }
    }
}

impl ShapeParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_area_ratio, self.max_area_ratio);
        if !(min.is_finite() && max.is_finite() && 0.0 <= min && min < max && max <= 1.0) {
            return Err(ConfigError::InvalidAreaRatios { min, max });
        }
        let (min, max) = (self.min_xy_ratio, self.max_xy_ratio);
        if !(min.is_finite() && max.is_finite() && 0.0 < min && min < 1.0 && 1.0 < max) {
            return Err(ConfigError::InvalidXyRatios { min, max });
        }
        let eps = self.epsilon_ratio;
        if !(eps.is_finite() && eps > 0.0 && eps < 1.0) {
            return Err(ConfigError::InvalidEpsilonRatio(eps));
        }
        Ok(())
    }
}

/// Full configuration of a target field detector.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetFieldParams {
    /// Measured side length of the physical innermost square.
    pub physical_size_cm: f64,
    /// Gray level above which a blurred pixel becomes foreground.
    pub gray_threshold: u8,
    /// Box blur kernel size applied before thresholding (odd).
    pub blur_kernel_size: u32,
    pub shape: ShapeParams,
    pub classifier: ClassifierKind,
}

impl Default for TargetFieldParams {
    fn default() -> Self {
        Self {
            physical_size_cm: 6.0,
            gray_threshold: 120,
            blur_kernel_size: 5,
            shape: ShapeParams::default(),
            classifier: ClassifierKind::AreaExtremes,
        }
    }
}

impl TargetFieldParams {
    /// Check every field; run once before any frame is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.physical_size_cm.is_finite() && self.physical_size_cm > 0.0) {
            return Err(ConfigError::InvalidPhysicalSize(self.physical_size_cm));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::InvalidBlurKernel(self.blur_kernel_size));
        }
        self.shape.validate()
    }
}
