//! Keypoint and group transform operations

use glam::DVec2;

use super::SceneState;
use crate::state::selection::{GroupSelection, KeypointRef};
use crate::transform::{move_point, propagate, to_point};

impl SceneState {
    /// Move one keypoint to an absolute position and refresh its bones
    pub fn move_keypoint(&mut self, kref: &KeypointRef, position: DVec2) -> bool {
        let Some(skeleton) = self.scene.skeleton_mut(&kref.group_id) else {
            return false;
        };
        let moved = move_point(skeleton, kref.index, position);
        if moved {
            self.version += 1;
        }
        moved
    }

    /// Write the group's derived positions into the scene.
    ///
    /// All positions are stored first, then bones are refreshed, so a bone
    /// whose two endpoints are both in the group ends up consistent.
    pub fn apply_group(&mut self, group: &GroupSelection) -> usize {
        let mut touched: Vec<&KeypointRef> = Vec::new();
        for (kref, position) in group.placements() {
            let Some(skeleton) = self.scene.skeleton_mut(&kref.group_id) else {
                continue;
            };
            if let Some(kp) = skeleton.keypoints.get_mut(kref.index) {
                kp.position = to_point(position);
                touched.push(kref);
            }
        }
        for kref in &touched {
            if let Some(skeleton) = self.scene.skeleton_mut(&kref.group_id) {
                propagate(skeleton, kref.index);
            }
        }
        if !touched.is_empty() {
            self.version += 1;
        }
        touched.len()
    }
}
