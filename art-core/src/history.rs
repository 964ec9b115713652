//! Linear undo/redo history of document snapshots.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::ArtDocument;

/// Default number of undo steps retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One committed transaction: the document before and after it.
///
/// Snapshots are shared and immutable once recorded.
#[derive(Debug, Clone)]
pub struct UndoRecord {
    /// Human-readable operation name, e.g. `"Move"`.
    pub name: String,
    /// The document before the transaction.
    pub before: Arc<ArtDocument>,
    /// The document after the transaction.
    pub after: Arc<ArtDocument>,
}

/// Undo and redo stacks.
///
/// Recording a new transaction discards everything that could have been
/// redone. When the undo stack grows past its limit the oldest record is
/// dropped.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<UndoRecord>,
    redo: Vec<UndoRecord>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history keeping at most `limit` undo steps.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a committed transaction.
    pub fn record(&mut self, record: UndoRecord) {
        self.redo.clear();
        if self.undo.len() >= self.limit {
            if let Some(dropped) = self.undo.pop_front() {
                tracing::debug!(name = %dropped.name, "History limit reached, dropping oldest step");
            }
        }
        self.undo.push_back(record);
    }

    /// Move the newest undo record onto the redo stack and return it.
    pub fn undo(&mut self) -> Option<&UndoRecord> {
        let record = self.undo.pop_back()?;
        self.redo.push(record);
        self.redo.last()
    }

    /// Move the newest redo record back onto the undo stack and return it.
    pub fn redo(&mut self) -> Option<&UndoRecord> {
        let record = self.redo.pop()?;
        self.undo.push_back(record);
        self.undo.back()
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Name of the step [`History::undo`] would revert.
    #[must_use]
    pub fn undo_name(&self) -> Option<&str> {
        self.undo.back().map(|r| r.name.as_str())
    }

    /// Name of the step [`History::redo`] would reapply.
    #[must_use]
    pub fn redo_name(&self) -> Option<&str> {
        self.redo.last().map(|r| r.name.as_str())
    }

    /// Number of undo steps held.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
