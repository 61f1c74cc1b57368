//! Host-side collaborators: the upload transport for preview images and the
//! external pose-estimation source. The session owns a `HostBinding` that
//! mirrors what the host node currently stores.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::state::settings::PreviewSettings;

/// Posts a rendered preview and returns the name the host stored it under.
#[async_trait]
pub trait UploadAdapter: Send + Sync {
    async fn upload(&self, filename: &str, png: Vec<u8>) -> Result<String, String>;
}

/// Ready-made keypoint JSON from a pose-estimation node, if it has produced any.
pub trait PoseSource {
    fn pose_json(&self) -> Option<String>;
}

impl PoseSource for Option<String> {
    fn pose_json(&self) -> Option<String> {
        self.clone()
    }
}

/// What the host node currently holds for this editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostBinding {
    /// Last pose JSON pushed to the host
    pub saved_pose: Option<String>,
    /// Image reference returned by the last successful upload
    pub image: Option<String>,
    preview_counter: u32,
}

impl HostBinding {
    pub fn is_current(&self, json: &str) -> bool {
        self.saved_pose.as_deref() == Some(json)
    }

    /// Next `<prefix><n>.png`; n cycles so the host's preview cache refreshes.
    pub fn next_preview_filename(&mut self, settings: &PreviewSettings) -> String {
        let slots = settings.slots.max(1);
        let name = format!("{}{}.png", settings.filename_prefix, self.preview_counter % slots);
        self.preview_counter = (self.preview_counter + 1) % slots;
        name
    }
}

/// `pose-<unix millis>.json`
pub fn suggested_export_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("pose-{millis}.json")
}
