//! Bounded undo/redo over whole-document snapshots.
//!
//! Each step stores a full copy of the document. The cap counts snapshots,
//! not edit operations.

use std::collections::VecDeque;

use crate::model::HostsDocument;

pub const HISTORY_CAP: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<HostsDocument>,
    cursor: usize,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_cap(HISTORY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: 0,
            cap: cap.max(1),
        }
    }

    /// History seeded with the freshly loaded document.
    pub fn starting_at(doc: &HostsDocument) -> Self {
        let mut h = Self::new();
        h.push(doc);
        h
    }

    /// Record a new state. Drops any redo tail, evicts the oldest snapshot past the cap.
    pub fn push(&mut self, doc: &HostsDocument) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(doc.clone());
        if self.snapshots.len() > self.cap {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back. None at the oldest snapshot.
    pub fn undo(&mut self) -> Option<HostsDocument> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor).cloned()
    }

    /// Step forward. None at the newest snapshot.
    pub fn redo(&mut self) -> Option<HostsDocument> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor < self.snapshots.len() - 1
    }

    pub fn current(&self) -> Option<&HostsDocument> {
        self.snapshots.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
