//! JSON command protocol for the host panel.
//!
//! Each button callback of the host maps to one command. Requests against an
//! empty or wrong selection are reported as unsuccessful and change nothing.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use shared::{KeypointInput, Point2D};

use crate::error::StateError;
use crate::state::{skeleton_display_name, EditorSession, KeypointRef, Selection};

/// A command the host can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Add a skeleton; the default pose when no keypoints are given
    AddPose {
        #[serde(default)]
        keypoints: Option<Vec<KeypointInput>>,
    },
    /// Remove the skeletons touched by the selection
    RemovePose,
    /// Widen the selection to whole skeletons
    SelectAll,
    ToggleVisibility,
    /// Clear the canvas.
    Reset,
    Resize {
        width: u32,
        height: u32,
    },
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    SelectKeypoint {
        group_id: String,
        index: usize,
    },
    SelectKeypoints {
        keypoints: Vec<KeypointRef>,
    },
    ToggleKeypoint {
        group_id: String,
        index: usize,
    },
    /// Clear selection.
    ClearSelection,
    /// Drag one keypoint and release
    MoveKeypoint {
        group_id: String,
        index: usize,
        x: f64,
        y: f64,
    },
    /// Transform the selected group and release
    TransformGroup {
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        angle: Option<f64>,
        #[serde(default)]
        scale_x: Option<f64>,
        #[serde(default)]
        scale_y: Option<f64>,
        #[serde(default)]
        flip_x: bool,
        #[serde(default)]
        flip_y: bool,
    },
    /// Hit-test a canvas position
    Pick {
        x: f64,
        y: f64,
    },
    /// Export the scene as OpenPose JSON.
    Export,
    /// Load an OpenPose JSON document
    Load {
        json: String,
    },
    /// Inspect the scene: list all skeletons.
    Inspect,
    /// Persist the session settings to the user's config directory
    SaveSettings,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

impl From<StateError> for CommandResponse {
    fn from(e: StateError) -> Self {
        Self::err(e.to_string())
    }
}

fn require_keypoint(session: &EditorSession, kref: &KeypointRef) -> Result<(), StateError> {
    match session.scene.get_keypoint(kref) {
        Some(_) => Ok(()),
        None => Err(StateError::UnknownKeypoint {
            group_id: kref.group_id.clone(),
            index: kref.index,
        }),
    }
}

/// Execute a single command on the session.
pub fn execute_command(session: &mut EditorSession, cmd: EditorCommand) -> CommandResponse {
    match cmd {
        EditorCommand::AddPose { keypoints } => match session.add_pose(keypoints.as_deref()) {
            Some(id) => CommandResponse::ok_with_data(serde_json::json!({ "group_id": id })),
            None => CommandResponse::err("a pose needs 18 keypoints"),
        },

        EditorCommand::RemovePose => {
            if session.selection.active().is_none() {
                return StateError::NothingSelected.into();
            }
            let removed = session.remove_pose();
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        EditorCommand::SelectAll => {
            if !session.select_all() {
                return StateError::NothingSelected.into();
            }
            CommandResponse::ok_with_data(serde_json::json!({ "selected": session.selection.count() }))
        }

        EditorCommand::ToggleVisibility => {
            if session.selection.active().is_none() {
                return StateError::NothingSelected.into();
            }
            let changed = session.toggle_visibility();
            CommandResponse::ok_with_data(serde_json::json!({ "changed": changed }))
        }

        EditorCommand::Reset => {
            session.reset();
            CommandResponse::ok()
        }

        EditorCommand::Resize { width, height } => {
            let settings = &session.settings;
            if !settings.dimension_in_range(width) || !settings.dimension_in_range(height) {
                return CommandResponse::err(format!(
                    "canvas size must be between {} and {}",
                    settings.canvas.min_dimension, settings.canvas.max_dimension
                ));
            }
            session.resize(width, height);
            CommandResponse::ok()
        }

        EditorCommand::Undo => {
            let success = session.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        EditorCommand::Redo => {
            let success = session.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        EditorCommand::SelectKeypoint { group_id, index } => {
            let kref = KeypointRef::new(group_id, index);
            if let Err(e) = require_keypoint(session, &kref) {
                return e.into();
            }
            session.select_keypoint(kref);
            CommandResponse::ok()
        }

        EditorCommand::SelectKeypoints { keypoints } => {
            if !session.select_keypoints(&keypoints) {
                return StateError::NothingSelected.into();
            }
            CommandResponse::ok_with_data(serde_json::json!({ "selected": session.selection.count() }))
        }

        EditorCommand::ToggleKeypoint { group_id, index } => {
            let kref = KeypointRef::new(group_id, index);
            if let Err(e) = require_keypoint(session, &kref) {
                return e.into();
            }
            session.toggle_keypoint(kref);
            CommandResponse::ok_with_data(serde_json::json!({ "selected": session.selection.count() }))
        }

        EditorCommand::ClearSelection => {
            session.clear_selection();
            CommandResponse::ok()
        }

        EditorCommand::MoveKeypoint {
            group_id,
            index,
            x,
            y,
        } => {
            let kref = KeypointRef::new(group_id, index);
            if let Err(e) = require_keypoint(session, &kref) {
                return e.into();
            }
            session.select_keypoint(kref);
            session.begin_transform();
            session.move_keypoint(DVec2::new(x, y));
            session.finish_transform();
            CommandResponse::ok()
        }

        EditorCommand::TransformGroup {
            dx,
            dy,
            angle,
            scale_x,
            scale_y,
            flip_x,
            flip_y,
        } => {
            if !matches!(session.selection.active(), Some(Selection::Group(_))) {
                return StateError::NotAGroup.into();
            }
            session.begin_transform();
            let placed = session.update_transform(|t| {
                if flip_x {
                    t.flip_horizontal();
                }
                if flip_y {
                    t.flip_vertical();
                }
                if scale_x.is_some() || scale_y.is_some() {
                    t.scale_about_center(scale_x.unwrap_or(t.scale_x), scale_y.unwrap_or(t.scale_y));
                }
                if let Some(angle) = angle {
                    t.rotate_about_center(angle);
                }
                t.translate(DVec2::new(dx, dy));
            });
            session.finish_transform();
            CommandResponse::ok_with_data(serde_json::json!({
                "placed": placed,
                "flipped": session.presentation().flipped,
            }))
        }

        EditorCommand::Pick { x, y } => {
            let render = &session.settings.render;
            let hit = session
                .scene
                .scene
                .pick(Point2D::new(x, y), render.keypoint_radius, render.bone_width);
            CommandResponse::ok_with_data(serde_json::json!({ "hit": hit }))
        }

        EditorCommand::Export => match session.export_json() {
            Ok(json) => CommandResponse::ok_with_data(serde_json::json!({
                "filename": crate::host::suggested_export_filename(),
                "pose_json": json,
            })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::Load { json } => match session.import_json(&json) {
            Ok(count) => CommandResponse::ok_with_data(serde_json::json!({ "loaded": count })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::Inspect => {
            let scene = &session.scene.scene;
            let skeletons: Vec<serde_json::Value> = scene
                .skeletons
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "group_id": s.group_id,
                        "name": skeleton_display_name(s),
                        "visible_keypoints": s.keypoints.iter().filter(|k| k.visible).count(),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "canvas_width": scene.canvas_width,
                "canvas_height": scene.canvas_height,
                "skeleton_count": skeletons.len(),
                "skeletons": skeletons,
                "selected": session.selection.count(),
                "can_undo": session.can_undo(),
                "can_redo": session.can_redo(),
            }))
        }

        EditorCommand::SaveSettings => match session.settings.save() {
            Ok(()) => CommandResponse::ok(),
            Err(e) => CommandResponse::err(e.to_string()),
        },
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(session: &mut EditorSession, json: &str) -> Result<CommandResponse, String> {
    let cmd: EditorCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(session, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    session: &mut EditorSession,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EditorCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(session, cmd))
        .collect())
}
