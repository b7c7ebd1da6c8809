//! Single-slot undo memory.
//!
//! # Invariants
//! - At most one entry exists; recording overwrites it.
//! - `take` hands the entry out once and leaves the slot empty.
//! - Lives outside `LeadBoard`, so rendering and filtering never see it.

use crate::model::lead::{LeadId, LeadStatus};

/// Last reversible transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    pub lead_id: LeadId,
    pub previous_status: LeadStatus,
    /// Position the lead held inside `previous_status`.
    pub previous_index: usize,
}

#[derive(Debug, Default)]
pub struct UndoMemory {
    slot: Option<UndoEntry>,
}

impl UndoMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entry`, replacing any earlier one.
    pub fn record(&mut self, entry: UndoEntry) {
        self.slot = Some(entry);
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.slot.as_ref()
    }

    /// Consumes the entry.
    pub fn take(&mut self) -> Option<UndoEntry> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{UndoEntry, UndoMemory};
    use crate::model::lead::LeadStatus;
    use uuid::Uuid;

    fn entry(previous_status: LeadStatus) -> UndoEntry {
        UndoEntry {
            lead_id: Uuid::new_v4(),
            previous_status,
            previous_index: 0,
        }
    }

    #[test]
    fn record_overwrites_previous_entry() {
        let mut memory = UndoMemory::new();
        memory.record(entry(LeadStatus::New));
        let latest = entry(LeadStatus::Contacted);
        memory.record(latest);

        assert_eq!(memory.peek(), Some(&latest));
    }

    #[test]
    fn take_consumes_once() {
        let mut memory = UndoMemory::new();
        let recorded = entry(LeadStatus::OfferSent);
        memory.record(recorded);

        assert_eq!(memory.take(), Some(recorded));
        assert_eq!(memory.take(), None);
        assert!(memory.is_empty());
    }
}
