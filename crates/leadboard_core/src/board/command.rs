//! Reversible board commands.
//!
//! # Responsibility
//! - Model each bucket transition as an `{apply, rollback}` pair.
//! - Keep the transition executor independent of the store's concrete shape.
//!
//! # Invariants
//! - `rollback` after a successful `apply` restores the prior state exactly,
//!   provided nothing else touched the moved lead in between.
//! - `rollback` after a failed `apply` is never called by the executor.

use crate::board::store::LeadBoard;
use crate::model::lead::{LeadId, LeadStatus};

/// A state change that can be undone locally.
pub trait ReversibleCommand<S> {
    /// Applies the change. Returns `false` when it was a no-op.
    fn apply(&self, state: &mut S) -> bool;
    /// Reverses a previously applied change.
    fn rollback(&self, state: &mut S);
}

/// Moves one lead between columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveLead {
    pub lead_id: LeadId,
    pub from: LeadStatus,
    /// Position inside `from` before the move; rollback reinserts there.
    pub from_index: usize,
    pub to: LeadStatus,
    /// Insertion point inside `to`; `None` appends.
    pub to_index: Option<usize>,
}

impl MoveLead {
    /// Builds a move for `lead_id` from wherever it currently sits.
    ///
    /// Returns `None` when the lead is unknown or already in `to`.
    pub fn plan(board: &LeadBoard, lead_id: LeadId, to: LeadStatus) -> Option<Self> {
        let (from, from_index) = board.locate(lead_id)?;
        if from == to {
            return None;
        }
        Some(Self {
            lead_id,
            from,
            from_index,
            to,
            to_index: None,
        })
    }

    /// Places the lead at `index` inside the target column instead of appending.
    pub fn inserting_at(mut self, index: usize) -> Self {
        self.to_index = Some(index);
        self
    }
}

impl ReversibleCommand<LeadBoard> for MoveLead {
    fn apply(&self, board: &mut LeadBoard) -> bool {
        match self.to_index {
            Some(index) => board.relocate_at(self.lead_id, self.from, self.to, index),
            None => board.relocate(self.lead_id, self.from, self.to),
        }
    }

    fn rollback(&self, board: &mut LeadBoard) {
        board.relocate_at(self.lead_id, self.to, self.from, self.from_index);
    }
}
