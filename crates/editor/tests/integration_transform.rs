//! Integration tests for group transforms, selection and host sync.

use std::sync::Mutex;

use assert_approx_eq::assert_approx_eq;
use async_trait::async_trait;
use glam::DVec2;
use pose_editor::host::UploadAdapter;
use pose_editor::state::{KeypointRef, Selection};
use pose_editor::validation::validate_scene;
use pose_editor::{EditorError, EditorSession};
use shared::{Scene, DEFAULT_POSE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn positions(scene: &Scene, group_id: &str) -> Vec<(f64, f64)> {
    scene
        .skeleton(group_id)
        .map(|s| s.keypoints.iter().map(|k| (k.position.x, k.position.y)).collect())
        .unwrap_or_default()
}

fn assert_positions_eq(a: &[(f64, f64)], b: &[(f64, f64)]) {
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert_approx_eq!(p.0, q.0, 1e-9);
        assert_approx_eq!(p.1, q.1, 1e-9);
    }
}

#[test]
fn test_rotate_180_and_back() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    let original = positions(&s.scene.scene, &id);

    assert_eq!(s.rotate_group(180.0), 18);
    let rotated = positions(&s.scene.scene, &id);
    // Point reflection through the bounding-box centre
    let (cx, cy) = ((163.0 + 332.0) / 2.0, (59.0 + 456.0) / 2.0);
    for (p, q) in original.iter().zip(&rotated) {
        assert_approx_eq!(q.0, 2.0 * cx - p.0, 1e-9);
        assert_approx_eq!(q.1, 2.0 * cy - p.1, 1e-9);
    }

    s.rotate_group(0.0);
    assert_positions_eq(&positions(&s.scene.scene, &id), &original);
    assert!(validate_scene(&s.scene.scene, 1e-9).is_empty());
}

#[test]
fn test_rotate_full_turn_in_steps() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    let original = positions(&s.scene.scene, &id);
    for step in 1..=4 {
        s.rotate_group(90.0 * step as f64);
    }
    assert_positions_eq(&positions(&s.scene.scene, &id), &original);
}

#[test]
fn test_flip_and_back() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    let original = positions(&s.scene.scene, &id);

    s.flip_group_horizontal();
    let flipped = positions(&s.scene.scene, &id);
    assert_approx_eq!(flipped[0].0, (163.0 + 332.0) - original[0].0, 1e-9);
    assert_approx_eq!(flipped[0].1, original[0].1, 1e-9);
    assert!(s.presentation().flipped);

    s.flip_group_horizontal();
    assert_positions_eq(&positions(&s.scene.scene, &id), &original);
    assert!(!s.presentation().flipped);
}

#[test]
fn test_rotated_flip_and_back() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    let original = positions(&s.scene.scene, &id);
    s.rotate_group(30.0);
    s.flip_group_vertical();
    s.scale_group(1.5, 0.5);
    s.scale_group(1.0, 1.0);
    s.flip_group_vertical();
    s.rotate_group(0.0);
    assert_positions_eq(&positions(&s.scene.scene, &id), &original);
}

#[test]
fn test_scale_about_centre() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    s.scale_group(2.0, 2.0);
    let scaled = positions(&s.scene.scene, &id);
    let (cx, cy) = ((163.0 + 332.0) / 2.0, (59.0 + 456.0) / 2.0);
    assert_approx_eq!(scaled[0].0, cx + 2.0 * (DEFAULT_POSE[0].x - cx), 1e-9);
    assert_approx_eq!(scaled[0].1, cy + 2.0 * (DEFAULT_POSE[0].y - cy), 1e-9);
    assert!(validate_scene(&s.scene.scene, 1e-9).is_empty());
}

#[test]
fn test_single_move_is_local() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    let before = s.scene.get_skeleton(&id).unwrap().clone();

    s.select_keypoint(KeypointRef::new(id.clone(), 7));
    assert!(s.move_keypoint(DVec2::new(400.0, 300.0)));

    let after = s.scene.get_skeleton(&id).unwrap();
    let anchored = &after.keypoints[7].bones;
    for (i, (b0, b1)) in before.bones.iter().zip(&after.bones).enumerate() {
        if anchored.contains(&i) {
            assert_ne!(b0, b1);
        } else {
            assert_eq!(b0, b1, "bone {i} changed");
        }
    }
    for (i, (k0, k1)) in before.keypoints.iter().zip(&after.keypoints).enumerate() {
        if i != 7 {
            assert_eq!(k0, k1);
        }
    }
    assert!(validate_scene(&s.scene.scene, 1e-9).is_empty());
}

#[test]
fn test_moving_face_moves_bone_starts() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    s.select_keypoint(KeypointRef::new(id.clone(), 0));
    s.move_keypoint(DVec2::new(10.0, 20.0));
    let sk = s.scene.get_skeleton(&id).unwrap();
    for &b in &sk.keypoints[0].bones {
        assert_eq!(sk.bones[b].start.x, 10.0);
        assert_eq!(sk.bones[b].start.y, 20.0);
    }
}

#[test]
fn test_select_all_stays_in_skeleton() {
    let mut s = EditorSession::default();
    let a = s.add_pose(None).unwrap();
    let b = s.add_pose(Some(&pose_editor::fixtures::offset_pose(150.0, 0.0))).unwrap();

    s.select_keypoint(KeypointRef::new(a.clone(), 4));
    assert!(s.select_all());
    let members = s.selection.all();
    assert_eq!(members.len(), 18);
    assert!(members.iter().all(|m| m.group_id == a));
    assert!(!members.iter().any(|m| m.group_id == b));
    assert!(matches!(s.selection.active(), Some(Selection::Group(_))));
}

#[test]
fn test_select_all_spans_both_skeletons() {
    let mut s = EditorSession::default();
    let a = s.add_pose(None).unwrap();
    let b = s.add_pose(None).unwrap();
    s.select_keypoints(&[KeypointRef::new(a, 1), KeypointRef::new(b, 2)]);
    assert!(s.select_all());
    assert_eq!(s.selection.count(), 36);
}

#[test]
fn test_toggle_majority_visible_hides_all() {
    let mut s = EditorSession::default();
    let id = s.add_pose(None).unwrap();
    let hidden: Vec<_> = (10..18).map(|i| KeypointRef::new(id.clone(), i)).collect();
    s.scene.set_visibility(&hidden, false);

    s.select_all();
    assert_eq!(s.toggle_visibility(), 18);
    let sk = s.scene.get_skeleton(&id).unwrap();
    assert!(sk.keypoints.iter().all(|k| !k.visible));
    assert!(sk.bones.iter().all(|b| !b.visible));
}

#[test]
fn test_remove_partial_group_removes_whole_skeletons() {
    let mut s = EditorSession::default();
    let a = s.add_pose(None).unwrap();
    let b = s.add_pose(None).unwrap();
    let c = s.add_pose(None).unwrap();
    s.select_keypoints(&[KeypointRef::new(a.clone(), 0), KeypointRef::new(c.clone(), 9)]);
    assert_eq!(s.remove_pose(), 2);
    assert!(s.scene.get_skeleton(&b).is_some());
    assert_eq!(s.scene.skeleton_count(), 1);
}

// ── Host sync ───────────────────────────────────────────────────

#[derive(Default)]
struct RecordingUploader {
    uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl UploadAdapter for RecordingUploader {
    async fn upload(&self, filename: &str, png: Vec<u8>) -> Result<String, String> {
        assert!(png.starts_with(b"\x89PNG"));
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(filename.to_string());
        }
        Ok(format!("stored/{filename}"))
    }
}

struct FailingUploader;

#[async_trait]
impl UploadAdapter for FailingUploader {
    async fn upload(&self, _filename: &str, _png: Vec<u8>) -> Result<String, String> {
        Err("connection refused".into())
    }
}

#[tokio::test]
async fn test_sync_uploads_only_on_change() {
    init_tracing();
    let uploader = RecordingUploader::default();
    let mut s = EditorSession::default();
    s.add_pose(None);

    assert!(s.sync_to_host(&uploader).await.unwrap());
    assert_eq!(s.host.image.as_deref(), Some("stored/OpenPose_0.png"));
    assert!(!s.sync_to_host(&uploader).await.unwrap());

    s.translate_group(DVec2::new(5.0, 0.0));
    assert!(s.sync_to_host(&uploader).await.unwrap());
    assert_eq!(
        *uploader.uploads.lock().unwrap(),
        vec!["OpenPose_0.png".to_string(), "OpenPose_1.png".to_string()]
    );
    assert_eq!(s.host.saved_pose, Some(s.export_json().unwrap()));
}

#[tokio::test]
async fn test_sync_failure_keeps_scene() {
    init_tracing();
    let mut s = EditorSession::default();
    s.add_pose(None);
    let before = s.scene.scene.clone();
    let err = s.sync_to_host(&FailingUploader).await.unwrap_err();
    assert!(matches!(err, EditorError::Upload(_)));
    assert_eq!(s.scene.scene, before);
    assert!(s.host.image.is_none());
    assert!(!s.is_suppressed());
}
