//! Scene state management
//!
//! This module provides the scene with its skeletons, the operations that
//! mutate it, and the snapshot history used for undo/redo.

mod display;
mod history;
mod skeleton_ops;
mod transform_ops;

pub use display::{short_id, skeleton_display_name, DisplayScale};
pub use history::{History, HistoryLock};

use shared::{Keypoint, Scene, Skeleton};

use super::selection::KeypointRef;

/// Scene state with skeletons and canvas dimensions
#[derive(Debug, Default)]
pub struct SceneState {
    /// Current scene
    pub scene: Scene,
    /// Monotonically increasing version counter for render invalidation
    pub(crate) version: u64,
}

impl SceneState {
    pub fn new(scene: Scene) -> Self {
        Self { scene, version: 0 }
    }

    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get a skeleton by group id
    pub fn get_skeleton(&self, group_id: &str) -> Option<&Skeleton> {
        self.scene.skeleton(group_id)
    }

    /// Get a keypoint by reference
    pub fn get_keypoint(&self, kref: &KeypointRef) -> Option<&Keypoint> {
        self.scene.keypoint(&kref.group_id, kref.index)
    }

    pub fn skeleton_count(&self) -> usize {
        self.scene.skeletons.len()
    }

    /// Replace the whole scene (snapshot restore)
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.version += 1;
    }
}
