//! Crate-level error types.
//!
//! The fusion kernel itself never fails; these cover the ambient pieces
//! around it (configuration, sensor delivery, image classification and the
//! desktop host).

use std::fmt;

/// Errors produced by the panorama_fusion crate.
#[derive(Debug)]
pub enum PanoramaError {
    /// Generic I/O failure (reading a config file).
    Io(std::io::Error),
    /// Config file is not valid JSON for `ViewerConfig`.
    ConfigParse(serde_json::Error),
    /// Config parsed but holds values the engine cannot use.
    InvalidConfig(String),
    /// Failed to read a panorama image header.
    Image(image::ImageError),
    /// Failed to spawn the motion feed thread.
    ThreadSpawn(std::io::Error),
    /// Motion source reported a failure.
    Sensor(String),
    /// Window / GPU set-up failure in the desktop host.
    Viewer(String),
}

impl fmt::Display for PanoramaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "config parse error: {e}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Image(e) => write!(f, "image error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::Sensor(msg) => write!(f, "sensor error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for PanoramaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PanoramaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PanoramaError {
    fn from(e: serde_json::Error) -> Self {
        Self::ConfigParse(e)
    }
}

impl From<image::ImageError> for PanoramaError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

pub type Result<T> = std::result::Result<T, PanoramaError>;
