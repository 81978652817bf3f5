//! Projection mode of the loaded panorama image.

use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Spherical,   // 2:1 equirectangular, full 3-axis look
    Cylindrical, // anything else: yaw only, no pitch, no roll
}

impl ProjectionMode {
    /// Exactly 2:1 is spherical; every other ratio falls back to cylindrical.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > 0 && u64::from(width) == 2 * u64::from(height) {
            Self::Spherical
        } else {
            Self::Cylindrical
        }
    }

    pub fn allows_vertical(self) -> bool {
        self == Self::Spherical
    }

    pub fn allows_roll(self) -> bool {
        self == Self::Spherical
    }
}

/// Classify an image file by its header dimensions. Pixel data is not decoded.
pub fn classify_image(path: &Path) -> Result<(ProjectionMode, (u32, u32))> {
    let (w, h) = image::image_dimensions(path)?;
    let mode = ProjectionMode::from_dimensions(w, h);
    log::info!("panorama {path:?}: {w}x{h} -> {mode:?}");
    Ok((mode, (w, h)))
}
