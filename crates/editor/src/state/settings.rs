//! Editor settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What happens to eye markers while the active transform is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyePolicy {
    /// Eyes are always drawn
    #[default]
    Keep,
    /// Eyes are suppressed while exactly one axis is mirrored
    HideWhenMirrored,
}

/// Canvas settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Canvas width for a new session
    pub width: u32,
    /// Canvas height for a new session
    pub height: u32,
    /// Background color RGB
    pub background: [u8; 3],
    /// Smallest dimension the host inputs accept
    pub min_dimension: u32,
    /// Largest dimension the host inputs accept
    pub max_dimension: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            background: [0, 0, 0],
            min_dimension: 64,
            max_dimension: 4096,
        }
    }
}

/// Undo/redo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum undo entries kept, floor snapshot included
    pub limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

/// Keypoint and bone drawing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub keypoint_radius: f64,
    pub bone_width: f64,
    /// Bone opacity (0.0 - 1.0)
    pub bone_alpha: f32,
    pub eyes: EyePolicy,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            keypoint_radius: 5.0,
            bone_width: 10.0,
            bone_alpha: 0.7,
            eyes: EyePolicy::Keep,
        }
    }
}

/// Host preview upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Number of filenames cycled through so the host preview refreshes
    pub slots: u32,
    pub filename_prefix: String,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            slots: 10,
            filename_prefix: "OpenPose_".to_string(),
        }
    }
}

/// All editor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub canvas: CanvasSettings,
    pub history: HistorySettings,
    pub render: RenderSettings,
    pub preview: PreviewSettings,
}

impl EditorSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "openpose", "pose-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load from an explicit path; missing or malformed files give defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings; missing sections and fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Save settings to the platform config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory")
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Whether a canvas dimension lies within the host input bounds
    pub fn dimension_in_range(&self, value: u32) -> bool {
        (self.canvas.min_dimension..=self.canvas.max_dimension).contains(&value)
    }
}
