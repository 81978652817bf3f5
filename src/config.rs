//! Viewer configuration.
//!
//! A JSON file of [`ViewerConfig`] fields, all optional. Lookup order:
//! `--config <path>`, then `PANORAMA_CONFIG`, then
//! `<exe_dir>/assets/panorama.json`, then `./assets/panorama.json`, then
//! built-in defaults. The control method can be overridden with
//! `--control <motion|touch|both>` or `PANORAMA_CONTROL`.

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::control::ControlMethod;
use crate::error::{PanoramaError, Result};
use crate::events::PanSpeed;
use crate::fov::FovBounds;
use crate::motion::DEFAULT_INTERVAL;

pub const CONFIG_FILE: &str = "panorama.json";
pub const CONFIG_ENV: &str = "PANORAMA_CONFIG";
pub const CONTROL_ENV: &str = "PANORAMA_CONTROL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub control_method: ControlMethod,
    pub pan_speed: PanSpeed,
    /// Degrees, exclusive.
    pub min_fov: f64,
    /// Degrees, inclusive. Also the FoV after a reset.
    pub max_fov: f64,
    /// Radians.
    pub start_angle: f64,
    pub motion_interval_ms: u64,
    pub report_epsilon_degrees: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let bounds = FovBounds::default();
        Self {
            control_method: ControlMethod::default(),
            pan_speed: PanSpeed::default(),
            min_fov: bounds.min,
            max_fov: bounds.max,
            start_angle: 0.0,
            motion_interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            report_epsilon_degrees: 0.5,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn fov_bounds(&self) -> FovBounds {
        FovBounds::new(self.min_fov, self.max_fov)
    }

    pub fn motion_interval(&self) -> Duration {
        Duration::from_millis(self.motion_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PanoramaError::InvalidConfig(msg));

        if !(self.min_fov.is_finite() && self.max_fov.is_finite()) {
            return invalid("fov bounds must be finite".into());
        }
        if !(0.0 < self.min_fov && self.min_fov < self.max_fov && self.max_fov < 180.0) {
            return invalid(format!(
                "fov bounds must satisfy 0 < min < max < 180, got min={} max={}",
                self.min_fov, self.max_fov
            ));
        }
        let PanSpeed { x, y } = self.pan_speed;
        if !(x.is_finite() && y.is_finite() && x >= 0.0 && y >= 0.0) {
            return invalid(format!("pan speed must be finite and non-negative, got ({x}, {y})"));
        }
        if !self.start_angle.is_finite() {
            return invalid("start angle must be finite".into());
        }
        if self.motion_interval_ms == 0 {
            return invalid("motion interval must be > 0 ms".into());
        }
        if !(self.report_epsilon_degrees.is_finite() && self.report_epsilon_degrees >= 0.0) {
            return invalid("report epsilon must be finite and >= 0".into());
        }
        Ok(())
    }

    /// Resolve from the process arguments and environment.
    pub fn resolve() -> Result<Self> {
        Self::resolve_from(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Same as [`ViewerConfig::resolve`] with injectable args and env lookup.
    pub fn resolve_from<I, E>(args: I, env: E) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut config_arg = None;
        let mut control_arg = None;

        let mut it = args.into_iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "--config" => config_arg = it.next(),
                "--control" => control_arg = it.next(),
                _ => {}
            }
        }

        let env_nonempty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mut config = match config_arg.or_else(|| env_nonempty(CONFIG_ENV)) {
            // An explicitly named file must load.
            Some(path) => Self::load(Path::new(&path))?,
            None => match find_config_file() {
                Some(p) => Self::load(&p)?,
                None => Self::default(),
            },
        };

        if let Some(method) = control_arg.or_else(|| env_nonempty(CONTROL_ENV)) {
            config.control_method = method.parse()?;
        }

        Ok(config)
    }
}

/// Find assets/panorama.json by searching:
/// 1) <exe_dir>/assets/panorama.json
/// 2) ./assets/panorama.json  (dev working dir)
fn find_config_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join(CONFIG_FILE);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join(CONFIG_FILE);
    if p.exists() {
        return Some(p);
    }

    None
}
