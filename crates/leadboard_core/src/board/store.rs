//! Record store: the authoritative partition of leads by pipeline stage.
//!
//! # Responsibility
//! - Hold `{status -> ordered leads}` for every `LeadStatus`.
//! - Provide read access and the single bucket mutation primitive.
//!
//! # Invariants
//! - Every `LeadStatus` key is present, possibly with an empty column.
//! - A lead appears in exactly one column and its `status` tag names that column.
//! - Relocation moves a lead; it never copies or drops one.

use crate::model::lead::{Lead, LeadId, LeadStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partitioned lead collection backing the kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<LeadStatus, Vec<Lead>>", into = "BTreeMap<LeadStatus, Vec<Lead>>")]
pub struct LeadBoard {
    columns: BTreeMap<LeadStatus, Vec<Lead>>,
}

impl From<BTreeMap<LeadStatus, Vec<Lead>>> for LeadBoard {
    fn from(columns: BTreeMap<LeadStatus, Vec<Lead>>) -> Self {
        let mut board = Self::new();
        for (status, leads) in columns {
            let column = board.column_mut(status);
            column.extend(leads.into_iter().map(|lead| lead.in_status(status)));
        }
        board
    }
}

impl From<LeadBoard> for BTreeMap<LeadStatus, Vec<Lead>> {
    fn from(board: LeadBoard) -> Self {
        board.columns
    }
}

impl Default for LeadBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadBoard {
    /// Creates a board with every column present and empty.
    pub fn new() -> Self {
        Self {
            columns: LeadStatus::ALL
                .into_iter()
                .map(|status| (status, Vec::new()))
                .collect(),
        }
    }

    /// Partitions a flat list by each lead's `status`.
    ///
    /// Input order is preserved within a column.
    pub fn from_leads(leads: impl IntoIterator<Item = Lead>) -> Self {
        let mut board = Self::new();
        for lead in leads {
            board.column_mut(lead.status).push(lead);
        }
        board
    }

    /// Leads of one column in display order.
    pub fn column(&self, status: LeadStatus) -> &[Lead] {
        self.columns.get(&status).map_or(&[], Vec::as_slice)
    }

    /// Iterates columns in kanban order.
    pub fn columns(&self) -> impl Iterator<Item = (LeadStatus, &[Lead])> {
        self.columns
            .iter()
            .map(|(status, leads)| (*status, leads.as_slice()))
    }

    /// Iterates every lead, column by column.
    pub fn leads(&self) -> impl Iterator<Item = &Lead> {
        self.columns.values().flatten()
    }

    /// Total number of leads across all columns.
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-column counts in kanban order.
    pub fn bucket_counts(&self) -> Vec<(LeadStatus, usize)> {
        self.columns
            .iter()
            .map(|(status, leads)| (*status, leads.len()))
            .collect()
    }

    /// Finds the column and position of a lead by linear scan.
    pub fn locate(&self, lead_id: LeadId) -> Option<(LeadStatus, usize)> {
        self.columns.iter().find_map(|(status, leads)| {
            leads
                .iter()
                .position(|lead| lead.id == lead_id)
                .map(|index| (*status, index))
        })
    }

    pub fn get(&self, lead_id: LeadId) -> Option<&Lead> {
        self.leads().find(|lead| lead.id == lead_id)
    }

    /// Moves a lead from `from` to the end of `to`.
    ///
    /// Returns `false` and leaves the board untouched when `from == to` or the
    /// lead is not in `from`.
    pub fn relocate(&mut self, lead_id: LeadId, from: LeadStatus, to: LeadStatus) -> bool {
        self.relocate_at(lead_id, from, to, usize::MAX)
    }

    /// Moves a lead from `from` into `to` at `index`, clamped to the column length.
    ///
    /// Same no-op rules as [`LeadBoard::relocate`].
    pub fn relocate_at(
        &mut self,
        lead_id: LeadId,
        from: LeadStatus,
        to: LeadStatus,
        index: usize,
    ) -> bool {
        if from == to {
            return false;
        }
        let source = self.column_mut(from);
        let Some(position) = source.iter().position(|lead| lead.id == lead_id) else {
            return false;
        };
        let mut lead = source.remove(position);
        lead.status = to;

        let target = self.column_mut(to);
        let index = index.min(target.len());
        target.insert(index, lead);
        true
    }

    /// Replaces the notes of a lead. Returns `false` when the lead is unknown.
    pub fn set_notes(&mut self, lead_id: LeadId, notes: Option<String>) -> bool {
        match self.get_mut(lead_id) {
            Some(lead) => {
                lead.notes = notes;
                true
            }
            None => false,
        }
    }

    /// Flags a lead as read. Returns `true` only when the flag flipped.
    pub fn mark_read(&mut self, lead_id: LeadId) -> bool {
        match self.get_mut(lead_id) {
            Some(lead) if !lead.is_read => {
                lead.is_read = true;
                true
            }
            _ => false,
        }
    }

    fn get_mut(&mut self, lead_id: LeadId) -> Option<&mut Lead> {
        self.columns
            .values_mut()
            .flatten()
            .find(|lead| lead.id == lead_id)
    }

    fn column_mut(&mut self, status: LeadStatus) -> &mut Vec<Lead> {
        self.columns.entry(status).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::LeadBoard;
    use crate::model::lead::{Lead, LeadStatus};

    fn lead(name: &str, status: LeadStatus) -> Lead {
        Lead::new(name, "", 0).in_status(status)
    }

    #[test]
    fn new_board_has_every_column() {
        let board = LeadBoard::new();
        let keys = board.columns().map(|(status, _)| status).collect::<Vec<_>>();
        assert_eq!(keys, LeadStatus::ALL.to_vec());
        assert!(board.is_empty());
    }

    #[test]
    fn from_leads_partitions_by_status_and_keeps_order() {
        let a = lead("a", LeadStatus::New);
        let b = lead("b", LeadStatus::Won);
        let c = lead("c", LeadStatus::New);
        let board = LeadBoard::from_leads(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(board.column(LeadStatus::New), &[a, c][..]);
        assert_eq!(board.column(LeadStatus::Won), &[b][..]);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn relocate_appends_to_target_and_retags() {
        let a = lead("a", LeadStatus::New);
        let b = lead("b", LeadStatus::Contacted);
        let mut board = LeadBoard::from_leads(vec![a.clone(), b.clone()]);

        assert!(board.relocate(a.id, LeadStatus::New, LeadStatus::Contacted));
        let contacted = board.column(LeadStatus::Contacted);
        assert_eq!(contacted.len(), 2);
        assert_eq!(contacted[0].id, b.id);
        assert_eq!(contacted[1].id, a.id);
        assert_eq!(contacted[1].status, LeadStatus::Contacted);
        assert!(board.column(LeadStatus::New).is_empty());
    }

    #[test]
    fn relocate_same_bucket_is_noop() {
        let a = lead("a", LeadStatus::New);
        let mut board = LeadBoard::from_leads(vec![a.clone()]);
        let before = board.clone();

        assert!(!board.relocate(a.id, LeadStatus::New, LeadStatus::New));
        assert_eq!(board, before);
    }

    #[test]
    fn relocate_from_wrong_bucket_is_noop() {
        let a = lead("a", LeadStatus::New);
        let mut board = LeadBoard::from_leads(vec![a.clone()]);
        let before = board.clone();

        assert!(!board.relocate(a.id, LeadStatus::Won, LeadStatus::Lost));
        assert_eq!(board, before);
    }

    #[test]
    fn relocate_at_clamps_index() {
        let a = lead("a", LeadStatus::New);
        let b = lead("b", LeadStatus::Won);
        let mut board = LeadBoard::from_leads(vec![a.clone(), b.clone()]);

        assert!(board.relocate_at(a.id, LeadStatus::New, LeadStatus::Won, 0));
        assert_eq!(board.column(LeadStatus::Won)[0].id, a.id);
        assert!(board.relocate_at(b.id, LeadStatus::Won, LeadStatus::Lost, 42));
        assert_eq!(board.locate(b.id), Some((LeadStatus::Lost, 0)));
    }

    #[test]
    fn mark_read_flips_once() {
        let a = lead("a", LeadStatus::New);
        let mut board = LeadBoard::from_leads(vec![a.clone()]);

        assert!(board.mark_read(a.id));
        assert!(!board.mark_read(a.id));
        assert!(board.get(a.id).is_some_and(|lead| lead.is_read));
    }

    #[test]
    fn set_notes_does_not_move_lead() {
        let a = lead("a", LeadStatus::OfferSent);
        let mut board = LeadBoard::from_leads(vec![a.clone()]);

        assert!(board.set_notes(a.id, Some("call back friday".to_string())));
        assert_eq!(board.locate(a.id), Some((LeadStatus::OfferSent, 0)));
        assert_eq!(
            board.get(a.id).and_then(|lead| lead.notes.as_deref()),
            Some("call back friday")
        );
    }
}
