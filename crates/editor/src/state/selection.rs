use glam::DVec2;
use serde::{Deserialize, Serialize};
use shared::{GroupId, Scene};

use crate::transform::{to_vec, GroupTransform};

/// Reference to one keypoint of one skeleton
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeypointRef {
    pub group_id: GroupId,
    pub index: usize,
}

impl KeypointRef {
    pub fn new(group_id: impl Into<GroupId>, index: usize) -> Self {
        Self {
            group_id: group_id.into(),
            index,
        }
    }
}

/// Multi-keypoint selection transformed as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSelection {
    members: Vec<KeypointRef>,
    /// Offset of each member from the group centre at selection time
    locals: Vec<DVec2>,
    pub transform: GroupTransform,
}

impl GroupSelection {
    /// Capture members at their current positions. Unknown refs are dropped.
    pub fn capture(scene: &Scene, members: &[KeypointRef]) -> Option<Self> {
        let mut kept = Vec::with_capacity(members.len());
        let mut positions = Vec::with_capacity(members.len());
        for m in members {
            if kept.contains(m) {
                continue;
            }
            if let Some(kp) = scene.keypoint(&m.group_id, m.index) {
                kept.push(m.clone());
                positions.push(to_vec(kp.position));
            }
        }
        if kept.is_empty() {
            return None;
        }
        let min = positions.iter().fold(DVec2::splat(f64::MAX), |a, p| a.min(*p));
        let max = positions.iter().fold(DVec2::splat(f64::MIN), |a, p| a.max(*p));
        let center = (min + max) / 2.0;
        Some(Self {
            members: kept,
            locals: positions.iter().map(|p| *p - center).collect(),
            transform: GroupTransform::from_bounds(min, max),
        })
    }

    pub fn members(&self) -> &[KeypointRef] {
        &self.members
    }

    /// Members paired with their absolute positions under the current transform
    pub fn placements(&self) -> impl Iterator<Item = (&KeypointRef, DVec2)> + '_ {
        self.members
            .iter()
            .zip(&self.locals)
            .map(|(m, local)| (m, self.transform.place(*local)))
    }
}

/// The active selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Keypoint(KeypointRef),
    Group(GroupSelection),
}

impl Selection {
    pub fn members(&self) -> Vec<KeypointRef> {
        match self {
            Selection::Keypoint(k) => vec![k.clone()],
            Selection::Group(g) => g.members.clone(),
        }
    }

    /// Distinct group ids across the selection, in discovery order
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = Vec::new();
        match self {
            Selection::Keypoint(k) => ids.push(k.group_id.clone()),
            Selection::Group(g) => {
                for m in &g.members {
                    if !ids.contains(&m.group_id) {
                        ids.push(m.group_id.clone());
                    }
                }
            }
        }
        ids
    }
}

/// Every keypoint in the scene whose skeleton appears in the selection,
/// in scene order. Re-expands partial selections to whole skeletons.
pub fn resolve_group(scene: &Scene, selection: &Selection) -> Vec<KeypointRef> {
    let ids = selection.group_ids();
    scene
        .skeletons
        .iter()
        .filter(|s| ids.contains(&s.group_id))
        .flat_map(|s| (0..s.keypoints.len()).map(move |i| KeypointRef::new(s.group_id.clone(), i)))
        .collect()
}

/// Selection state; transient, never persisted
#[derive(Debug, Default)]
pub struct SelectionState {
    active: Option<Selection>,
}

impl SelectionState {
    pub fn active(&self) -> Option<&Selection> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Selection> {
        self.active.as_mut()
    }

    /// All selected keypoints (in order of selection)
    pub fn all(&self) -> Vec<KeypointRef> {
        self.active.as_ref().map(Selection::members).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        match &self.active {
            None => 0,
            Some(Selection::Keypoint(_)) => 1,
            Some(Selection::Group(g)) => g.members.len(),
        }
    }

    pub fn is_selected(&self, kref: &KeypointRef) -> bool {
        match &self.active {
            None => false,
            Some(Selection::Keypoint(k)) => k == kref,
            Some(Selection::Group(g)) => g.members.contains(kref),
        }
    }

    /// Select a single keypoint (clears previous selection)
    pub fn select(&mut self, kref: KeypointRef) {
        self.active = Some(Selection::Keypoint(kref));
    }

    /// Select several keypoints as one group. A single member becomes a
    /// keypoint selection; nothing valid clears the selection.
    pub fn select_many(&mut self, scene: &Scene, members: &[KeypointRef]) -> bool {
        self.active = match GroupSelection::capture(scene, members) {
            Some(g) if g.members.len() == 1 => {
                g.members.into_iter().next().map(Selection::Keypoint)
            }
            Some(g) => Some(Selection::Group(g)),
            None => None,
        };
        self.active.is_some()
    }

    /// Toggle one keypoint in or out of the selection (Ctrl+click behavior)
    pub fn toggle(&mut self, scene: &Scene, kref: KeypointRef) -> bool {
        let mut members = self.all();
        if let Some(pos) = members.iter().position(|m| *m == kref) {
            members.remove(pos);
        } else {
            members.push(kref);
        }
        if members.is_empty() {
            self.clear();
            return false;
        }
        self.select_many(scene, &members)
    }

    /// Replace the selection with every keypoint of the selected skeletons
    pub fn select_all(&mut self, scene: &Scene) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        let resolved = resolve_group(scene, active);
        self.select_many(scene, &resolved)
    }

    /// Clear all selection
    pub fn clear(&mut self) {
        self.active = None;
    }
}
