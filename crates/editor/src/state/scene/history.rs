//! Undo/redo over whole-scene snapshots

use shared::Scene;

/// Reentrancy guard: while suppressed, commits are ignored so that
/// restoring a snapshot never records itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryLock {
    suppressed: bool,
}

impl HistoryLock {
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    pub fn release(&mut self) {
        self.suppressed = false;
    }
}

/// Linear undo/redo stacks. The bottom undo entry is the floor state and
/// is never popped or evicted.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Scene>,
    redo_stack: Vec<Scene>,
    limit: usize,
}

impl History {
    /// Start with `floor` as the only undo entry
    pub fn new(floor: Scene, limit: usize) -> Self {
        Self {
            undo_stack: vec![floor],
            redo_stack: Vec::new(),
            limit: limit.max(2),
        }
    }

    /// Record a snapshot unless the lock is held. Clears the redo branch.
    pub fn commit(&mut self, scene: &Scene, lock: HistoryLock) -> bool {
        if lock.is_suppressed() {
            tracing::debug!("history commit suppressed");
            return false;
        }
        self.undo_stack.push(scene.clone());
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(1);
        }
        tracing::debug!(undo = self.undo_stack.len(), "history commit");
        true
    }

    /// Step back. Returns the snapshot to restore: the new top of the undo
    /// stack, which is the floor itself when nothing can be popped.
    pub fn undo(&mut self) -> Option<&Scene> {
        if self.undo_stack.len() > 1 {
            if let Some(top) = self.undo_stack.pop() {
                self.redo_stack.push(top);
            }
        }
        tracing::debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "undo");
        self.undo_stack.last()
    }

    /// Step forward. Returns the snapshot to restore, if any.
    pub fn redo(&mut self) -> Option<&Scene> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next);
        tracing::debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "redo");
        self.undo_stack.last()
    }

    /// Check if undo would step back
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history and start again from `floor`
    pub fn reset(&mut self, floor: Scene) {
        self.undo_stack.clear();
        self.undo_stack.push(floor);
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(width: u32) -> Scene {
        Scene {
            canvas_width: width,
            ..Scene::default()
        }
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut h = History::new(scene(1), 10);
        h.commit(&scene(2), HistoryLock::default());
        h.undo();
        assert!(h.can_redo());
        h.commit(&scene(3), HistoryLock::default());
        assert!(!h.can_redo());
        assert_eq!(h.undo_len(), 2);
    }

    #[test]
    fn test_suppressed_commit_ignored() {
        let mut h = History::new(scene(1), 10);
        let mut lock = HistoryLock::default();
        lock.suppress();
        assert!(!h.commit(&scene(2), lock));
        assert_eq!(h.undo_len(), 1);
        lock.release();
        assert!(h.commit(&scene(2), lock));
    }

    #[test]
    fn test_undo_floor_not_popped() {
        let mut h = History::new(scene(1), 10);
        assert_eq!(h.undo().map(|s| s.canvas_width), Some(1));
        assert_eq!(h.undo().map(|s| s.canvas_width), Some(1));
        assert_eq!(h.undo_len(), 1);
        assert!(!h.can_redo());
    }

    #[test]
    fn test_undo_redo_sequence() {
        let mut h = History::new(scene(1), 10);
        h.commit(&scene(2), HistoryLock::default());
        h.commit(&scene(3), HistoryLock::default());
        assert_eq!(h.undo().map(|s| s.canvas_width), Some(2));
        assert_eq!(h.undo().map(|s| s.canvas_width), Some(1));
        assert_eq!(h.redo().map(|s| s.canvas_width), Some(2));
        assert_eq!(h.redo().map(|s| s.canvas_width), Some(3));
        assert!(h.redo().is_none());
    }

    #[test]
    fn test_limit_keeps_floor() {
        let mut h = History::new(scene(0), 3);
        for w in 1..=5 {
            h.commit(&scene(w), HistoryLock::default());
        }
        assert_eq!(h.undo_len(), 3);
        h.undo();
        assert_eq!(h.undo().map(|s| s.canvas_width), Some(0));
    }

    #[test]
    fn test_reset() {
        let mut h = History::new(scene(1), 10);
        h.commit(&scene(2), HistoryLock::default());
        h.undo();
        h.reset(scene(9));
        assert_eq!(h.undo_len(), 1);
        assert_eq!(h.redo_len(), 0);
        assert_eq!(h.undo().map(|s| s.canvas_width), Some(9));
    }
}
