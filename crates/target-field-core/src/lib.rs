//! Detection of concentric black/white square target fields.
//!
//! The crate works on contours that were already traced from a binary image
//! (see the `target-field` facade for the `image`-based front end):
//!
//! 1. [`ShapeValidator`] keeps contours that plausibly outline a square.
//! 2. A [`SquareClassifier`] picks the innermost and outermost squares.
//! 3. [`DistanceEstimator`] converts the innermost square's offset from the
//!    image midline into centimeters and a [`DistanceBand`].
//!
//! [`TargetFieldDetector`] runs the three steps for one frame.

mod candidate;
mod classifier;
mod detector;
mod distance;
mod error;
mod geometry;
mod io;
mod logger;
mod params;
mod types;
mod validator;

pub use candidate::SquareCandidate;
pub use classifier::{
    AreaExtremesClassifier, ClassificationResult, ClassifierKind, HierarchyAnomaly,
    HierarchyClassifier, SquareClassifier, SquareRole,
};
pub use detector::{TargetFieldDetection, TargetFieldDetector};
pub use distance::{pixel_distance, DistanceBand, DistanceEstimator, DistanceMeasurement};
pub use error::{ConfigError, ConfigIoError, DetectError};
pub use geometry::{approximate_polygon, arc_length, bounding_rect, ContourMoments};
pub use params::{ShapeParams, TargetFieldParams};
pub use types::{Contour, HierarchyLink, Point2D, Rect, RgbColor};
pub use validator::{is_square_candidate, RejectReason, ShapeValidator};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
