//! Facade crate for concentric square target field detection.
//!
//! This crate provides:
//! - re-exports of the image-free core (`target-field-core`)
//! - (feature `image`) an end-to-end front end that blurs, binarizes and
//!   traces contours with `imageproc` before running the core detector.
//!
//! ## Quickstart
//!
//! ```no_run
//! use target_field::detect;
//! use target_field::{TargetFieldDetector, TargetFieldParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("frame.png")?.decode()?.to_luma8();
//! let detector = TargetFieldDetector::new(TargetFieldParams::default())?;
//!
//! let detection = detect::detect_target_field(&img, &detector)?;
//! if let Some(line) = detection.status_line() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `target_field::core`: geometry, shape validation, classification, distance.
//! - `target_field::detect` (feature `image`): helpers from `image::GrayImage`
//!   or raw buffers, and the sequential frame loop.

pub use target_field_core as core;

pub use target_field_core::{
    ClassificationResult, ClassifierKind, DistanceBand, DistanceMeasurement, SquareCandidate,
    SquareClassifier, SquareRole, TargetFieldDetection, TargetFieldDetector, TargetFieldParams,
};

#[cfg(feature = "image")]
pub mod detect;
