use std::collections::VecDeque;

use crate::surface::Snapshot;

/// Number of snapshots kept for undo
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Undo/redo stacks of full surface snapshots.
///
/// The top of the undo stack is always the state currently on screen, so
/// the oldest entry is the state before any recorded edit.
pub struct SnapshotHistory {
    /// Oldest entry at the front
    undo_stack: VecDeque<Snapshot>,
    /// Most recently undone entry last
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SnapshotHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(limit + 1),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records `snapshot` as the new current state and drops any redo entries
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Steps back one entry and returns the state to show
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let undone = self.undo_stack.pop_back()?;
        self.redo_stack.push(undone);
        self.undo_stack.back().cloned()
    }

    /// Re-applies the most recently undone entry and returns it
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push_back(snapshot.clone());
        Some(snapshot)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    /// Swaps the current entry without touching either stack's length.
    /// Used when the surface changes in a way that is not an undo step.
    pub fn replace_current(&mut self, snapshot: Snapshot) {
        match self.undo_stack.back_mut() {
            Some(current) => *current = snapshot,
            None => self.undo_stack.push_back(snapshot),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use egui::Color32;

    fn snapshot(shade: u8) -> Snapshot {
        let mut surface = RasterSurface::new(2, 2, Color32::WHITE);
        surface.fill(Color32::from_gray(shade));
        surface.snapshot()
    }

    #[test]
    fn single_entry_cannot_be_undone() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn undo_returns_previous_state() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(0));
        history.push(snapshot(1));
        assert_eq!(history.undo(), Some(snapshot(0)));
        assert_eq!(history.redo(), Some(snapshot(1)));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn replace_current_keeps_redo() {
        let mut history = SnapshotHistory::default();
        history.push(snapshot(0));
        history.push(snapshot(1));
        history.undo();
        history.replace_current(snapshot(2));
        assert!(history.can_redo());
        assert_eq!(history.current(), Some(&snapshot(2)));
    }
}
