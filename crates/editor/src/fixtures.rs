//! Factory functions for creating test data.
//!
//! Pose documents in each accepted interchange form, plus helpers that
//! build keypoint sets and scenes directly.

use shared::*;

// ── Keypoint factories ──────────────────────────────────────────

/// The canonical standing pose as owned inputs.
pub fn default_pose() -> Vec<KeypointInput> {
    DEFAULT_POSE.to_vec()
}

/// The canonical pose shifted by `(dx, dy)`.
pub fn offset_pose(dx: f64, dy: f64) -> [KeypointInput; KEYPOINT_COUNT] {
    DEFAULT_POSE.map(|p| KeypointInput {
        x: p.x + dx,
        y: p.y + dy,
        visible: p.visible,
    })
}

/// Flat `(x, y, 1.0)` triples for one person.
pub fn pose_triples(points: &[KeypointInput]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, 1.0]).collect()
}

// ── Scene factories ─────────────────────────────────────────────

/// A scene holding one skeleton per pose.
pub fn scene_with_poses(poses: &[[KeypointInput; KEYPOINT_COUNT]]) -> Scene {
    let mut scene = Scene::default();
    for (i, pose) in poses.iter().enumerate() {
        scene.skeletons.push(Skeleton::new(format!("pose{i}"), pose));
    }
    scene
}

// ── Documents ───────────────────────────────────────────────────

/// Canonical document with the default pose on a 512x512 canvas.
pub fn default_pose_document() -> String {
    serde_json::json!([{
        "canvas_width": 512,
        "canvas_height": 512,
        "people": [{ "pose_keypoints_2d": pose_triples(&DEFAULT_POSE) }]
    }])
    .to_string()
}

/// Two people, the second shifted 200px right.
pub fn two_people_document() -> String {
    serde_json::json!([{
        "canvas_width": 768,
        "canvas_height": 512,
        "people": [
            { "pose_keypoints_2d": pose_triples(&DEFAULT_POSE) },
            { "pose_keypoints_2d": pose_triples(&offset_pose(200.0, 0.0)) }
        ]
    }])
    .to_string()
}

/// Legacy `{width, height, keypoints}` form with one person.
pub fn minimal_document() -> String {
    let keypoints: Vec<[f64; 2]> = DEFAULT_POSE.iter().map(|p| [p.x, p.y]).collect();
    serde_json::to_string(&MinimalPoseFile {
        width: 512,
        height: 512,
        keypoints,
    })
    .unwrap_or_default()
}

/// Canonical document whose person carries `count` keypoints.
pub fn document_with_keypoints(count: usize) -> String {
    let values: Vec<f64> = (0..count).flat_map(|i| [i as f64, i as f64, 1.0]).collect();
    serde_json::json!([{
        "canvas_width": 512,
        "canvas_height": 512,
        "people": [{ "pose_keypoints_2d": values }]
    }])
    .to_string()
}
