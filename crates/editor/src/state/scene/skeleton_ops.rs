//! Skeleton CRUD operations

use shared::{GroupId, KeypointInput, Skeleton, KEYPOINT_COUNT};

use super::{skeleton_display_name, SceneState};
use crate::state::selection::KeypointRef;

impl SceneState {
    /// Add a skeleton built from the first 18 points. Fewer than 18 is a no-op.
    pub fn add_skeleton(&mut self, points: &[KeypointInput]) -> Option<GroupId> {
        let Some(points) = points.get(..KEYPOINT_COUNT) else {
            tracing::warn!("Ignoring pose with {} keypoints", points.len());
            return None;
        };
        let points: [KeypointInput; KEYPOINT_COUNT] = points.try_into().ok()?;

        let mut group_id = uuid::Uuid::new_v4().to_string();
        while self.scene.skeleton(&group_id).is_some() {
            group_id = uuid::Uuid::new_v4().to_string();
        }

        let skeleton = Skeleton::new(group_id.clone(), &points);
        tracing::info!("Added {}", skeleton_display_name(&skeleton));
        self.scene.skeletons.push(skeleton);
        self.version += 1;
        Some(group_id)
    }

    /// Remove every skeleton in `group_ids`; returns how many were removed
    pub fn remove_skeletons(&mut self, group_ids: &[GroupId]) -> usize {
        let before = self.scene.skeletons.len();
        self.scene
            .skeletons
            .retain(|s| !group_ids.contains(&s.group_id));
        let removed = before - self.scene.skeletons.len();
        if removed > 0 {
            tracing::info!("Removed {removed} pose(s)");
            self.version += 1;
        }
        removed
    }

    /// Show or hide keypoints and their bones; returns how many changed
    pub fn set_visibility(&mut self, refs: &[KeypointRef], visible: bool) -> usize {
        let mut changed = 0;
        for r in refs {
            if let Some(skeleton) = self.scene.skeleton_mut(&r.group_id) {
                if r.index < skeleton.keypoints.len() {
                    skeleton.set_keypoint_visible(r.index, visible);
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            self.version += 1;
        }
        changed
    }

    /// Clear to zero skeletons on a fixed background
    pub fn clear(&mut self, background: [u8; 3]) {
        self.scene.skeletons.clear();
        self.scene.background = background;
        self.version += 1;
    }

    /// Set the canvas size. Stored coordinates are not rescaled.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::warn!("Ignoring canvas size {width}x{height}");
            return false;
        }
        self.scene.canvas_width = width;
        self.scene.canvas_height = height;
        self.version += 1;
        true
    }
}
