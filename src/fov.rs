//! Field of view (zoom) and its clamp bounds.

/// Vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FieldOfView(pub f64);

impl FieldOfView {
    pub fn degrees(self) -> f64 {
        self.0
    }

    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Horizontal extent for a view of the given aspect (width / height),
    /// `2·atan(tan(v/2)·aspect)`, in degrees.
    pub fn horizontal_degrees(self, aspect: f64) -> f64 {
        let v = self.radians();
        (2.0 * ((v / 2.0).tan() * aspect).atan()).to_degrees()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovBounds {
    pub min: f64,
    pub max: f64,
}

impl FovBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lower bound is exclusive, upper bound inclusive.
    pub fn accepts(self, fov: f64) -> bool {
        fov > self.min && fov <= self.max
    }
}

impl Default for FovBounds {
    fn default() -> Self {
        Self { min: 40.0, max: 100.0 }
    }
}
