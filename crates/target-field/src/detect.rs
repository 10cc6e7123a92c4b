use crate::core::{
    self, Contour, HierarchyLink, Point2D, TargetFieldDetection, TargetFieldDetector,
};
use ::image::{GrayImage, RgbImage};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::filter::box_filter;
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Core(#[from] core::DetectError),

    #[error(transparent)]
    Config(#[from] core::ConfigError),
}

/// Box blur followed by a binary threshold: pixels strictly brighter than
/// `gray_threshold` become 255, the rest 0.
pub fn binarize(gray: &GrayImage, params: &core::TargetFieldParams) -> GrayImage {
    let radius = params.blur_kernel_size / 2;
    let blurred = box_filter(gray, radius, radius);
    threshold(&blurred, params.gray_threshold, ThresholdType::Binary)
}

/// Trace every border of a binary mask, outer borders and holes alike.
///
/// Returns contours in tracing order together with their nesting links.
pub fn extract_contours(mask: &GrayImage) -> (Vec<Contour>, Vec<HierarchyLink>) {
    let traced = imageproc::contours::find_contours::<i32>(mask);
    let parents: Vec<Option<usize>> = traced.iter().map(|c| c.parent).collect();
    let contours: Vec<Contour> = traced
        .into_iter()
        .map(|c| c.points.into_iter().map(|p| Point2D::new(p.x, p.y)).collect())
        .collect();
    (contours, HierarchyLink::from_parents(&parents))
}

/// Run the full pipeline on a grayscale frame.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(gray, detector),
        fields(width = gray.width(), height = gray.height())
    )
)]
pub fn detect_target_field(
    gray: &GrayImage,
    detector: &TargetFieldDetector,
) -> Result<TargetFieldDetection, DetectError> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(core::DetectError::InvalidDimensions { width, height }.into());
    }
    let mask = binarize(gray, detector.params());
    let (contours, hierarchy) = extract_contours(&mask);
    Ok(detector.detect(&contours, &hierarchy, width, height)?)
}

/// Convert an RGB frame to grayscale and run [`detect_target_field`].
pub fn detect_target_field_rgb(
    rgb: &RgbImage,
    detector: &TargetFieldDetector,
) -> Result<TargetFieldDetection, DetectError> {
    let gray = ::image::imageops::grayscale(rgb);
    detect_target_field(&gray, detector)
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<GrayImage, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    }
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

pub fn detect_target_field_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    detector: &TargetFieldDetector,
) -> Result<TargetFieldDetection, DetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    detect_target_field(&img, detector)
}

/// Process frames one after another until the source is exhausted.
///
/// Each frame is detected and handed to `on_frame` (with its position in the
/// stream) before the next frame is pulled. The first acquisition or
/// detection error stops the loop and is returned. On success, returns the
/// number of frames processed.
pub fn process_frames<I, E, F>(
    frames: I,
    detector: &TargetFieldDetector,
    mut on_frame: F,
) -> Result<usize, E>
where
    I: IntoIterator<Item = Result<GrayImage, E>>,
    E: From<DetectError>,
    F: FnMut(usize, &TargetFieldDetection),
{
    let mut processed = 0;
    for frame in frames {
        let gray = frame?;
        let detection = detect_target_field(&gray, detector)?;
        on_frame(processed, &detection);
        processed += 1;
    }
    debug!("processed {processed} frames");
    Ok(processed)
}
