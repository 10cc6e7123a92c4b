/// Invalid configuration, reported once when a detector is built.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("physical size of the innermost square must be positive and finite (got {0} cm)")]
    InvalidPhysicalSize(f64),
    #[error("area ratio bounds must satisfy 0 <= min < max <= 1 (min={min}, max={max})")]
    InvalidAreaRatios { min: f64, max: f64 },
    #[error("aspect ratio bounds must satisfy 0 < min < 1 < max (min={min}, max={max})")]
    InvalidXyRatios { min: f64, max: f64 },
    #[error("polygon approximation epsilon ratio must be in (0, 1) (got {0})")]
    InvalidEpsilonRatio(f64),
    #[error("blur kernel size must be odd and positive (got {0})")]
    InvalidBlurKernel(u32),
}

/// Malformed per-frame input handed to the detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("hierarchy length mismatch ({contours} contours, {links} links)")]
    HierarchyMismatch { contours: usize, links: usize },
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Errors from reading or writing JSON configuration files.
#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
