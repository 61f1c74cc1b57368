//! Skeleton validation utilities.
//!
//! `SkeletonValidator` checks the structural invariants of a skeleton:
//! keypoint count, bone topology, per-keypoint bone lists and that visible
//! bone endpoints sit on their keypoints.

use shared::{bones_of, Scene, Skeleton, BONES, BONE_COUNT, KEYPOINT_COUNT};

/// Validator for `Skeleton` integrity checks.
pub struct SkeletonValidator<'a> {
    skeleton: &'a Skeleton,
}

impl<'a> SkeletonValidator<'a> {
    /// Create a new validator for the given skeleton.
    pub fn new(skeleton: &'a Skeleton) -> Self {
        Self { skeleton }
    }

    pub fn has_keypoint_count(&self) -> bool {
        self.skeleton.keypoints.len() == KEYPOINT_COUNT
    }

    /// Bones match the fixed topology table, in order.
    pub fn is_topology_valid(&self) -> bool {
        self.skeleton.bones.len() == BONE_COUNT
            && self
                .skeleton
                .bones
                .iter()
                .zip(BONES.iter())
                .all(|(bone, &[from, to])| bone.from == from && bone.to == to)
    }

    /// Every keypoint lists exactly the bones touching it, primary first.
    pub fn are_bone_lists_valid(&self) -> bool {
        self.skeleton
            .keypoints
            .iter()
            .enumerate()
            .all(|(i, kp)| kp.bones == bones_of(i))
    }

    /// Visible bones start and end on their keypoints (within epsilon).
    pub fn are_bones_attached(&self, epsilon: f64) -> bool {
        self.skeleton.bones.iter().filter(|b| b.visible).all(|bone| {
            let (Some(a), Some(b)) = (
                self.skeleton.keypoints.get(bone.from),
                self.skeleton.keypoints.get(bone.to),
            ) else {
                return false;
            };
            bone.start.distance_to(a.position) <= epsilon && bone.end.distance_to(b.position) <= epsilon
        })
    }

    /// Hidden keypoints have hidden bones.
    pub fn is_visibility_consistent(&self) -> bool {
        self.skeleton
            .keypoints
            .iter()
            .filter(|kp| !kp.visible)
            .all(|kp| kp.bones.iter().all(|&b| self.skeleton.bones.get(b).is_some_and(|bone| !bone.visible)))
    }

    /// Run all checks and return a list of failures (empty if all pass).
    pub fn validate_all(&self, epsilon: f64) -> Vec<String> {
        let id = &self.skeleton.group_id;
        let mut errors = Vec::new();
        if !self.has_keypoint_count() {
            errors.push(format!(
                "{id}: {} keypoints, expected {KEYPOINT_COUNT}",
                self.skeleton.keypoints.len()
            ));
        }
        if !self.is_topology_valid() {
            errors.push(format!("{id}: bones do not match the topology table"));
        }
        if !self.are_bone_lists_valid() {
            errors.push(format!("{id}: keypoint bone lists are inconsistent"));
        }
        if !self.are_bones_attached(epsilon) {
            errors.push(format!("{id}: bone endpoints detached from keypoints"));
        }
        if !self.is_visibility_consistent() {
            errors.push(format!("{id}: hidden keypoint has a visible bone"));
        }
        errors
    }
}

/// Validate every skeleton of a scene; group ids must also be unique.
pub fn validate_scene(scene: &Scene, epsilon: f64) -> Vec<String> {
    let mut errors: Vec<String> = scene
        .skeletons
        .iter()
        .flat_map(|s| SkeletonValidator::new(s).validate_all(epsilon))
        .collect();
    for (i, s) in scene.skeletons.iter().enumerate() {
        if scene.skeletons[..i].iter().any(|o| o.group_id == s.group_id) {
            errors.push(format!("duplicate group id {}", s.group_id));
        }
    }
    errors
}
