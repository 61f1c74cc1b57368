pub mod scene;
pub mod selection;
pub mod settings;

use glam::DVec2;
use shared::{GroupId, KeypointInput, Scene, DEFAULT_POSE, KEYPOINT_COUNT};

use crate::error::{FormatError, Result, StateError};
use crate::host::{HostBinding, PoseSource, UploadAdapter};
use crate::interchange::{self, ParsedPoses};
use crate::render::{encode_png, render_scene, RenderOptions};
use crate::transform::{GroupTransform, TransformEngine};
use crate::EditorError;

pub use scene::{short_id, skeleton_display_name, DisplayScale, History, HistoryLock, SceneState};
pub use selection::{resolve_group, GroupSelection, KeypointRef, Selection, SelectionState};
pub use settings::{EditorSettings, EyePolicy};

/// Orientation-dependent presentation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Exactly one mirror axis is active on the last group transform
    pub flipped: bool,
    pub eyes_visible: bool,
}

/// One editor panel: its scene, history and selection.
///
/// Every mutating call goes through here so history commits and the
/// suppression lock stay consistent. Requests against a missing or invalid
/// selection do nothing and report `false`/`0`/`None`.
pub struct EditorSession {
    pub scene: SceneState,
    pub selection: SelectionState,
    pub settings: EditorSettings,
    pub host: HostBinding,
    history: History,
    lock: HistoryLock,
    engine: TransformEngine,
    viewport: (f64, f64),
    display: DisplayScale,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl EditorSession {
    /// Empty canvas; that state is the history floor.
    pub fn new(settings: EditorSettings) -> Self {
        let scene = Scene {
            canvas_width: settings.canvas.width,
            canvas_height: settings.canvas.height,
            background: settings.canvas.background,
            skeletons: Vec::new(),
        };
        let viewport = (scene.canvas_width as f64, scene.canvas_height as f64);
        let display = DisplayScale::fit(scene.canvas_width, scene.canvas_height, viewport);
        Self {
            history: History::new(scene.clone(), settings.history.limit),
            scene: SceneState::new(scene),
            selection: SelectionState::default(),
            host: HostBinding::default(),
            lock: HistoryLock::default(),
            engine: TransformEngine::default(),
            viewport,
            display,
            settings,
        }
    }

    /// Reopen a panel from the pose the host stored. A valid pose becomes
    /// the history floor; an unreadable one is logged and an empty canvas
    /// is used instead.
    pub fn open(settings: EditorSettings, saved_pose: Option<&str>) -> Self {
        let mut session = Self::new(settings);
        let Some(json) = saved_pose.filter(|json| !json.trim().is_empty()) else {
            return session;
        };
        match session.apply_document(json) {
            Ok(count) => {
                session.history.reset(session.scene.scene.clone());
                session.host.saved_pose = Some(json.to_string());
                tracing::info!("Restored {count} saved pose(s)");
            }
            Err(e) => tracing::warn!("Ignoring saved pose: {e}"),
        }
        session
    }

    /// `open` with settings read from the user's settings file
    pub fn open_from_config(saved_pose: Option<&str>) -> Self {
        Self::open(EditorSettings::load(), saved_pose)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_suppressed(&self) -> bool {
        self.lock.is_suppressed()
    }

    /// Record the current scene unless a restore is in progress
    pub fn commit(&mut self) -> bool {
        self.history.commit(&self.scene.scene, self.lock)
    }

    // ========================================================================
    // Skeleton operations
    // ========================================================================

    /// Add a skeleton (default pose when `points` is `None`) and select it
    /// as one group. Fewer than 18 points does nothing.
    pub fn add_pose(&mut self, points: Option<&[KeypointInput]>) -> Option<GroupId> {
        let points = points.unwrap_or(&DEFAULT_POSE);
        let group_id = self.scene.add_skeleton(points)?;
        let members: Vec<KeypointRef> = (0..KEYPOINT_COUNT)
            .map(|i| KeypointRef::new(group_id.clone(), i))
            .collect();
        self.selection.select_many(&self.scene.scene, &members);
        self.engine.reset();
        self.commit();
        Some(group_id)
    }

    /// Remove every skeleton touched by the selection. Returns skeletons removed.
    pub fn remove_pose(&mut self) -> usize {
        let Some(active) = self.selection.active() else {
            tracing::debug!("{}", StateError::NothingSelected);
            return 0;
        };
        let resolved = resolve_group(&self.scene.scene, active);
        let mut group_ids: Vec<GroupId> = Vec::new();
        for r in resolved {
            if !group_ids.contains(&r.group_id) {
                group_ids.push(r.group_id);
            }
        }
        let removed = self.scene.remove_skeletons(&group_ids);
        self.selection.clear();
        self.engine.reset();
        if removed > 0 {
            self.commit();
        }
        removed
    }

    /// Widen the selection to the whole skeletons it touches
    pub fn select_all(&mut self) -> bool {
        let selected = self.selection.select_all(&self.scene.scene);
        if selected {
            self.engine.reset();
        }
        selected
    }

    /// Single keypoint: invert it. Group: hide all when at least half are
    /// visible, otherwise show all. Returns keypoints changed.
    pub fn toggle_visibility(&mut self) -> usize {
        let (members, visible) = match self.selection.active() {
            None => {
                tracing::debug!("{}", StateError::NothingSelected);
                return 0;
            }
            Some(Selection::Keypoint(k)) => {
                let Some(kp) = self.scene.get_keypoint(k) else {
                    return 0;
                };
                (vec![k.clone()], !kp.visible)
            }
            Some(Selection::Group(g)) => {
                let on = g
                    .members()
                    .iter()
                    .filter(|m| self.scene.get_keypoint(m).is_some_and(|kp| kp.visible))
                    .count();
                let off = g.members().len() - on;
                (g.members().to_vec(), on < off)
            }
        };
        let changed = self.scene.set_visibility(&members, visible);
        if changed > 0 {
            self.commit();
        }
        changed
    }

    /// Empty the canvas
    pub fn reset(&mut self) {
        self.scene.clear(self.settings.canvas.background);
        self.selection.clear();
        self.engine.reset();
        tracing::info!("Canvas reset");
        self.commit();
    }

    /// Change canvas dimensions within the configured bounds; coordinates
    /// are kept, display scale refits. Same size is a no-op.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.settings.dimension_in_range(width) || !self.settings.dimension_in_range(height) {
            tracing::warn!("Ignoring canvas size {width}x{height}");
            return false;
        }
        let scene = &self.scene.scene;
        if (scene.canvas_width, scene.canvas_height) == (width, height) {
            return false;
        }
        if !self.scene.resize(width, height) {
            return false;
        }
        self.refit_display();
        tracing::info!("Canvas resized to {width}x{height}");
        self.commit();
        true
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Area the host can give the canvas, in screen pixels
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
        self.refit_display();
    }

    pub fn display_scale(&self) -> DisplayScale {
        self.display
    }

    pub fn display_size(&self) -> (f64, f64) {
        self.display
            .display_size(self.scene.scene.canvas_width, self.scene.scene.canvas_height)
    }

    fn refit_display(&mut self) {
        self.display = DisplayScale::fit(
            self.scene.scene.canvas_width,
            self.scene.scene.canvas_height,
            self.viewport,
        );
    }

    pub fn presentation(&self) -> Presentation {
        let flipped = self.engine.flipped();
        let eyes_visible = !(flipped && self.settings.render.eyes == EyePolicy::HideWhenMirrored);
        Presentation {
            flipped,
            eyes_visible,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_keypoint(&mut self, kref: KeypointRef) -> bool {
        if self.scene.get_keypoint(&kref).is_none() {
            return false;
        }
        self.selection.select(kref);
        self.engine.reset();
        true
    }

    pub fn select_keypoints(&mut self, members: &[KeypointRef]) -> bool {
        self.engine.reset();
        self.selection.select_many(&self.scene.scene, members)
    }

    /// Add or remove one keypoint from the selection
    pub fn toggle_keypoint(&mut self, kref: KeypointRef) -> bool {
        if self.scene.get_keypoint(&kref).is_none() {
            return false;
        }
        self.engine.reset();
        self.selection.toggle(&self.scene.scene, kref)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.engine.reset();
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Drag the selected single keypoint to `position`
    pub fn move_keypoint(&mut self, position: DVec2) -> bool {
        let Some(Selection::Keypoint(kref)) = self.selection.active() else {
            return false;
        };
        let kref = kref.clone();
        self.scene.move_keypoint(&kref, position)
    }

    /// Edit the selected group's transform and recompute its keypoints.
    /// Returns keypoints placed.
    pub fn update_transform(&mut self, edit: impl FnOnce(&mut GroupTransform)) -> usize {
        let Some(Selection::Group(group)) = self.selection.active_mut() else {
            return 0;
        };
        edit(&mut group.transform);
        let placed = self.scene.apply_group(group);
        self.engine.observe(group.transform.mirror);
        placed
    }

    pub fn translate_group(&mut self, delta: DVec2) -> usize {
        self.update_transform(|t| t.translate(delta))
    }

    pub fn rotate_group(&mut self, angle: f64) -> usize {
        self.update_transform(|t| t.rotate_about_center(angle))
    }

    pub fn scale_group(&mut self, scale_x: f64, scale_y: f64) -> usize {
        self.update_transform(|t| t.scale_about_center(scale_x, scale_y))
    }

    pub fn flip_group_horizontal(&mut self) -> usize {
        self.update_transform(GroupTransform::flip_horizontal)
    }

    pub fn flip_group_vertical(&mut self) -> usize {
        self.update_transform(GroupTransform::flip_vertical)
    }

    /// Start of a pointer drag. Nothing is recorded until it finishes.
    pub fn begin_transform(&self) -> bool {
        let active = self.selection.active().is_some();
        if active {
            tracing::debug!(members = self.selection.count(), "transform started");
        }
        active
    }

    /// End of a drag: the "modified" event that records history
    pub fn finish_transform(&mut self) -> bool {
        if self.selection.active().is_none() {
            return false;
        }
        self.commit()
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Scene) {
        self.lock.suppress();
        self.scene.set_scene(snapshot);
        self.selection.clear();
        self.engine.reset();
        self.refit_display();
        self.lock.release();
    }

    // ========================================================================
    // Interchange
    // ========================================================================

    pub fn export_json(&self) -> Result<String> {
        Ok(interchange::export_json(&self.scene.scene)?)
    }

    /// Replace the scene with a pose document. A rejected document leaves
    /// the scene untouched. Returns skeletons loaded.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let count = self.apply_document(json)?;
        self.commit();
        Ok(count)
    }

    fn apply_document(&mut self, json: &str) -> Result<usize> {
        let parsed = match self.parse_within_bounds(json) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Rejected pose document: {e}");
                return Err(e.into());
            }
        };

        self.scene.resize(parsed.width, parsed.height);
        self.scene.clear(self.settings.canvas.background);
        for points in &parsed.skeletons {
            self.scene.add_skeleton(points);
        }
        self.selection.clear();
        self.engine.reset();
        self.refit_display();
        tracing::info!(
            "Loaded {} pose(s) on a {}x{} canvas",
            parsed.skeletons.len(),
            parsed.width,
            parsed.height
        );
        Ok(parsed.skeletons.len())
    }

    fn parse_within_bounds(&self, json: &str) -> std::result::Result<ParsedPoses, FormatError> {
        let parsed = interchange::parse_document(json)?;
        if !self.settings.dimension_in_range(parsed.width)
            || !self.settings.dimension_in_range(parsed.height)
        {
            return Err(FormatError::InvalidCanvas);
        }
        Ok(parsed)
    }

    /// Ingest keypoints produced by an external pose-estimation source
    pub fn load_from_source(&mut self, source: &impl PoseSource) -> Result<usize> {
        let json = source
            .pose_json()
            .filter(|json| !json.trim().is_empty())
            .ok_or(StateError::NoPoseSource)?;
        match self.import_json(&json) {
            // Sources answer "[]" when nothing was detected
            Err(EditorError::Format(FormatError::Empty)) => Err(StateError::NoPoseSource.into()),
            other => other,
        }
    }

    // ========================================================================
    // Host sync
    // ========================================================================

    /// Clean capture of the scene (keypoints and bones only)
    pub fn render_png(&self) -> Result<Vec<u8>> {
        let scene = &self.scene.scene;
        if !self.settings.dimension_in_range(scene.canvas_width)
            || !self.settings.dimension_in_range(scene.canvas_height)
        {
            return Err(FormatError::InvalidCanvas.into());
        }
        let options = RenderOptions::from_settings(
            &self.settings.render,
            self.presentation().eyes_visible,
        );
        let img = render_scene(&self.scene.scene, &options);
        Ok(encode_png(&img)?)
    }

    /// Push the pose to the host if it changed since the last sync, then
    /// upload a preview. Returns `false` when the host was already current.
    pub async fn sync_to_host<U>(&mut self, uploader: &U) -> Result<bool>
    where
        U: UploadAdapter + ?Sized,
    {
        let json = self.export_json()?;
        if self.host.is_current(&json) {
            tracing::debug!("Host pose unchanged");
            return Ok(false);
        }

        self.lock.suppress();
        let png = self.render_png();
        self.lock.release();
        let png = png?;

        self.host.saved_pose = Some(json);
        let filename = self.host.next_preview_filename(&self.settings.preview);
        match uploader.upload(&filename, png).await {
            Ok(image) => {
                tracing::info!("Uploaded preview {filename} as {image}");
                self.host.image = Some(image);
                Ok(true)
            }
            Err(e) => {
                tracing::error!("Preview upload of {filename} failed: {e}");
                Err(EditorError::Upload(e))
            }
        }
    }
}
