use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mandelview_core::viewport::{INITIAL_LEFT, INITIAL_TOP, INITIAL_ZOOM_SCALE};
use mandelview_core::{Anchor, Viewport};
use mandelview_render::{hardware_concurrency, DispatchPolicy};

use crate::error::{AppError, Result};

/// How overlapping render requests are handled, as written in the settings
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySetting {
    #[default]
    Overlap,
    SingleFlight,
}

impl From<PolicySetting> for DispatchPolicy {
    fn from(value: PolicySetting) -> Self {
        match value {
            PolicySetting::Overlap => DispatchPolicy::Overlap,
            PolicySetting::SingleFlight => DispatchPolicy::SingleFlight,
        }
    }
}

/// Start-up configuration. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_step_budget")]
    pub initial_step_budget: u32,
    /// Pixels per complex unit at start-up; the zoom is its reciprocal.
    #[serde(default = "default_zoom_scale")]
    pub initial_zoom_scale: f64,
    #[serde(default = "default_top")]
    pub initial_top: f64,
    #[serde(default = "default_left")]
    pub initial_left: f64,
    /// Upper bound for the worker pool. Hardware concurrency when unset.
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub dispatch_policy: PolicySetting,
    #[serde(default)]
    pub palette_index: usize,
}

fn default_width() -> u32 {
    1254
}
fn default_height() -> u32 {
    880
}
fn default_step_budget() -> u32 {
    1024
}
fn default_zoom_scale() -> f64 {
    INITIAL_ZOOM_SCALE
}
fn default_top() -> f64 {
    INITIAL_TOP
}
fn default_left() -> f64 {
    INITIAL_LEFT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            initial_step_budget: default_step_budget(),
            initial_zoom_scale: default_zoom_scale(),
            initial_top: default_top(),
            initial_left: default_left(),
            max_workers: None,
            dispatch_policy: PolicySetting::default(),
            palette_index: 0,
        }
    }
}

impl Settings {
    /// Read settings from `path`, failing on I/O or JSON errors.
    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| AppError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from `path`, or `settings.json` next to the executable,
    /// falling back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map_or_else(default_path, Path::to_path_buf);
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Self::default();
        }
        match Self::read(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    pub fn anchor(&self) -> Anchor {
        Anchor::from_scale(self.initial_top, self.initial_left, self.initial_zoom_scale)
    }

    /// The start-up viewport. Fails on an empty canvas or a non-positive
    /// zoom scale.
    pub fn viewport(&self) -> Result<Viewport> {
        Ok(Viewport::new(self.anchor(), self.width, self.height)?)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers.unwrap_or_else(hardware_concurrency).max(1)
    }

    /// Half the worker ceiling, at least one.
    pub fn initial_workers(&self) -> usize {
        (self.max_workers() / 2).max(1)
    }
}

/// Directory containing the running executable, or the current directory.
fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn default_path() -> PathBuf {
    exe_directory().join("settings.json")
}
