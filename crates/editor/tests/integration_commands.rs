//! Integration tests for the JSON command protocol.

use pose_editor::command::{execute_json, execute_json_batch};
use pose_editor::fixtures::two_people_document;
use pose_editor::EditorSession;

#[test]
fn test_batch_add_select_toggle() {
    let mut s = EditorSession::default();
    let responses = execute_json_batch(
        &mut s,
        r#"[
            {"command": "add_pose"},
            {"command": "select_all"},
            {"command": "toggle_visibility"},
            {"command": "inspect"}
        ]"#,
    )
    .unwrap();
    assert_eq!(responses.len(), 4);
    assert!(responses.iter().all(|r| r.success));
    assert_eq!(responses[2].data.as_ref().unwrap()["changed"], 18);
    let data = responses[3].data.as_ref().unwrap();
    assert_eq!(data["skeletons"][0]["visible_keypoints"], 0);
}

#[test]
fn test_move_keypoint_command_commits() {
    let mut s = EditorSession::default();
    let resp = execute_json(&mut s, r#"{"command": "add_pose"}"#).unwrap();
    let id = resp.data.unwrap()["group_id"].as_str().unwrap().to_string();
    let undo_len = s.history().undo_len();

    let cmd = serde_json::json!({
        "command": "move_keypoint", "group_id": id, "index": 4, "x": 100.0, "y": 120.0
    });
    let resp = execute_json(&mut s, &cmd.to_string()).unwrap();
    assert!(resp.success);
    assert_eq!(s.history().undo_len(), undo_len + 1);
    assert_eq!(s.scene.get_skeleton(&id).unwrap().keypoints[4].position.x, 100.0);

    let resp = execute_json(&mut s, r#"{"command": "undo"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["undone"], true);
    assert_eq!(s.scene.get_skeleton(&id).unwrap().keypoints[4].position.x, 163.0);
}

#[test]
fn test_transform_group_command() {
    let mut s = EditorSession::default();
    execute_json(&mut s, r#"{"command": "add_pose"}"#).unwrap();
    let resp = execute_json(
        &mut s,
        r#"{"command": "transform_group", "flip_x": true, "dx": 10.0}"#,
    )
    .unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["placed"], 18);
    assert_eq!(data["flipped"], true);
}

#[test]
fn test_export_then_load() {
    let mut s = EditorSession::default();
    let resp = execute_json(
        &mut s,
        &serde_json::json!({ "command": "load", "json": two_people_document() }).to_string(),
    )
    .unwrap();
    assert_eq!(resp.data.unwrap()["loaded"], 2);

    let resp = execute_json(&mut s, r#"{"command": "export"}"#).unwrap();
    let data = resp.data.unwrap();
    assert!(data["filename"].as_str().unwrap().starts_with("pose-"));
    let json = data["pose_json"].as_str().unwrap().to_string();

    let mut other = EditorSession::default();
    let resp = execute_json(
        &mut other,
        &serde_json::json!({ "command": "load", "json": json }).to_string(),
    )
    .unwrap();
    assert!(resp.success);
    assert_eq!(other.scene.skeleton_count(), 2);
}

#[test]
fn test_load_bad_document_reports() {
    let mut s = EditorSession::default();
    let resp = execute_json(
        &mut s,
        r#"{"command": "load", "json": "[{\"canvas_width\": 0, \"canvas_height\": 5, \"people\": []}]"}"#,
    )
    .unwrap();
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("canvas width or height is invalid"));
}

#[test]
fn test_resize_and_reset() {
    let mut s = EditorSession::default();
    let responses = execute_json_batch(
        &mut s,
        r#"[
            {"command": "add_pose"},
            {"command": "resize", "width": 1024, "height": 768},
            {"command": "reset"},
            {"command": "inspect"}
        ]"#,
    )
    .unwrap();
    let data = responses[3].data.as_ref().unwrap();
    assert_eq!(data["canvas_width"], 1024);
    assert_eq!(data["skeleton_count"], 0);
    assert_eq!(data["can_undo"], true);
}

#[test]
fn test_state_errors_are_noops() {
    let mut s = EditorSession::default();
    let responses = execute_json_batch(
        &mut s,
        r#"[
            {"command": "select_all"},
            {"command": "toggle_visibility"},
            {"command": "remove_pose"}
        ]"#,
    )
    .unwrap();
    assert!(responses.iter().all(|r| !r.success));
    assert!(!s.can_undo());
}
