//! Transition controller for the lead board.
//!
//! # Responsibility
//! - Run bucket transitions as optimistic apply, persist, confirm or roll back.
//! - Own the record store, the undo slot, the open detail view and the
//!   notice queue for one board surface.
//!
//! # Invariants
//! - Guarded transitions (same bucket, unknown lead) never reach the gateway
//!   and never queue a notice.
//! - A failed persist restores the moved lead to its original column and position.
//! - Only confirmed user transitions create an undo entry; undo never does.
//! - Transitions of one lead are not serialized: the last response wins.
//!
//! # Interleaving
//! `begin_transition` and `settle_transition` split the algorithm at the
//! gateway await, so a host can keep several transitions in flight on one
//! thread. `request_transition` and `undo_last` run both halves around the
//! gateway call. A `PendingTransition` that is dropped unsettled leaves its
//! optimistic state in place.

use crate::board::command::{MoveLead, ReversibleCommand};
use crate::board::filter::{filter_board, FilterSpec, FilteredBoard};
use crate::board::store::LeadBoard;
use crate::board::undo::{UndoEntry, UndoMemory};
use crate::gateway::{GatewayResult, LeadGateway};
use crate::model::lead::{LeadId, LeadStatus};
use chrono::{DateTime, TimeZone};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::time::Instant;

/// Who asked for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    /// Drag-and-drop or a "move to" menu entry.
    User,
    /// Reversal of the last confirmed user transition.
    Undo,
}

/// A transition whose optimistic half is applied and whose persist is outstanding.
#[derive(Debug)]
#[must_use = "settle the transition with the gateway result"]
pub struct PendingTransition {
    command: MoveLead,
    origin: TransitionOrigin,
    started_at: Instant,
}

impl PendingTransition {
    pub fn lead_id(&self) -> LeadId {
        self.command.lead_id
    }

    pub fn from(&self) -> LeadStatus {
        self.command.from
    }

    pub fn to(&self) -> LeadStatus {
        self.command.to
    }

    pub fn origin(&self) -> TransitionOrigin {
        self.origin
    }
}

/// Result of one transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Guard hit: nothing changed, nothing was sent.
    Skipped,
    /// Persisted; the optimistic state stands.
    Confirmed {
        lead_id: LeadId,
        from: LeadStatus,
        to: LeadStatus,
        origin: TransitionOrigin,
    },
    /// Persist failed; the optimistic state was reverted.
    RolledBack {
        lead_id: LeadId,
        from: LeadStatus,
        to: LeadStatus,
        origin: TransitionOrigin,
        error: String,
    },
}

/// Transient notification for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Confirmation toast; the move is the current undo entry.
    Moved {
        lead_id: LeadId,
        from: LeadStatus,
        to: LeadStatus,
    },
    MoveFailed { lead_id: LeadId, message: String },
    Undone { lead_id: LeadId, status: LeadStatus },
    UndoFailed { lead_id: LeadId, message: String },
    NotesSaved { lead_id: LeadId },
    NotesFailed { lead_id: LeadId, message: String },
    /// Page-level error; the board stays empty until a reload succeeds.
    LoadFailed { message: String },
}

/// Result of opening the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a due read receipt should be passed to `send_read_receipt`"]
pub enum DetailOpen {
    /// The lead is not on the board; no panel is open.
    UnknownLead,
    /// Panel open; the lead was already read.
    Opened,
    /// Panel open for a lead that was unread until now.
    ReceiptDue(LeadId),
}

impl DetailOpen {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::UnknownLead)
    }
}

/// Open detail panel for one lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub lead_id: LeadId,
    /// Status shown in the panel; follows optimistic moves.
    pub status: LeadStatus,
    pub notes: Option<String>,
}

/// Board state owner and transition executor.
pub struct BoardController<G: LeadGateway> {
    gateway: G,
    board: LeadBoard,
    undo: UndoMemory,
    detail: Option<DetailView>,
    notices: VecDeque<Notice>,
    loaded: bool,
}

impl<G: LeadGateway> BoardController<G> {
    /// Creates an empty, not yet loaded controller.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            board: LeadBoard::new(),
            undo: UndoMemory::new(),
            detail: None,
            notices: VecDeque::new(),
            loaded: false,
        }
    }

    /// Creates a controller over an already fetched board.
    pub fn with_board(gateway: G, board: LeadBoard) -> Self {
        let mut controller = Self::new(gateway);
        controller.board = board;
        controller.loaded = true;
        controller
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn board(&self) -> &LeadBoard {
        &self.board
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn undo_entry(&self) -> Option<&UndoEntry> {
        self.undo.peek()
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Filtered view of the current board.
    pub fn filtered<Tz: TimeZone>(&self, spec: &FilterSpec, now: &DateTime<Tz>) -> FilteredBoard {
        filter_board(&self.board, spec, now)
    }

    /// Hands queued notices to the caller and empties the queue.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Fetches the board from the gateway, replacing local state.
    ///
    /// Returns `false` on failure; the board is then empty and unloaded.
    pub async fn load(&mut self) -> bool {
        let started_at = Instant::now();
        info!("event=board_load module=board status=start");

        match self.gateway.load_leads_partitioned().await {
            Ok(board) => {
                info!(
                    "event=board_load module=board status=ok leads={} duration_ms={}",
                    board.len(),
                    started_at.elapsed().as_millis()
                );
                self.board = board;
                self.loaded = true;
                self.undo.clear();
                self.detail = None;
                true
            }
            Err(err) => {
                error!(
                    "event=board_load module=board status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                self.board = LeadBoard::new();
                self.loaded = false;
                self.undo.clear();
                self.detail = None;
                self.notices.push_back(Notice::LoadFailed {
                    message: err.to_string(),
                });
                false
            }
        }
    }

    /// Locates the lead, guards, and applies the move optimistically.
    ///
    /// Returns `None` when the lead is unknown or already in `target`.
    pub fn begin_transition(
        &mut self,
        lead_id: LeadId,
        target: LeadStatus,
    ) -> Option<PendingTransition> {
        let command = MoveLead::plan(&self.board, lead_id, target)?;
        self.start(command, TransitionOrigin::User)
    }

    /// Consumes the undo entry and applies its reversal optimistically.
    ///
    /// Returns `None` when there is nothing to undo or the lead already sits
    /// in its previous column.
    pub fn begin_undo(&mut self) -> Option<PendingTransition> {
        let entry = self.undo.take()?;
        let command = MoveLead::plan(&self.board, entry.lead_id, entry.previous_status)?
            .inserting_at(entry.previous_index);
        self.start(command, TransitionOrigin::Undo)
    }

    /// Confirms or rolls back a pending transition from the gateway result.
    pub fn settle_transition(
        &mut self,
        pending: PendingTransition,
        result: GatewayResult<()>,
    ) -> TransitionOutcome {
        let PendingTransition {
            command,
            origin,
            started_at,
        } = pending;
        let duration_ms = started_at.elapsed().as_millis();

        match result {
            Ok(()) => {
                info!(
                    "event=lead_transition module=board status=ok origin={:?} lead_id={} from={} to={} duration_ms={}",
                    origin, command.lead_id, command.from, command.to, duration_ms
                );
                match origin {
                    TransitionOrigin::User => {
                        self.undo.record(UndoEntry {
                            lead_id: command.lead_id,
                            previous_status: command.from,
                            previous_index: command.from_index,
                        });
                        self.notices.push_back(Notice::Moved {
                            lead_id: command.lead_id,
                            from: command.from,
                            to: command.to,
                        });
                    }
                    TransitionOrigin::Undo => {
                        self.notices.push_back(Notice::Undone {
                            lead_id: command.lead_id,
                            status: command.to,
                        });
                    }
                }
                TransitionOutcome::Confirmed {
                    lead_id: command.lead_id,
                    from: command.from,
                    to: command.to,
                    origin,
                }
            }
            Err(err) => {
                warn!(
                    "event=lead_transition module=board status=error origin={:?} lead_id={} from={} to={} duration_ms={} error_code=persist_failed error={}",
                    origin, command.lead_id, command.from, command.to, duration_ms, err
                );
                command.rollback(&mut self.board);
                self.sync_detail_status(command.lead_id);

                let message = err.to_string();
                self.notices.push_back(match origin {
                    TransitionOrigin::User => Notice::MoveFailed {
                        lead_id: command.lead_id,
                        message: message.clone(),
                    },
                    TransitionOrigin::Undo => Notice::UndoFailed {
                        lead_id: command.lead_id,
                        message: message.clone(),
                    },
                });
                TransitionOutcome::RolledBack {
                    lead_id: command.lead_id,
                    from: command.from,
                    to: command.to,
                    origin,
                    error: message,
                }
            }
        }
    }

    /// Full transition: optimistic apply, persist, confirm or roll back.
    ///
    /// Drag-and-drop and menu moves both enter here.
    pub async fn request_transition(
        &mut self,
        lead_id: LeadId,
        target: LeadStatus,
    ) -> TransitionOutcome {
        let Some(pending) = self.begin_transition(lead_id, target) else {
            return TransitionOutcome::Skipped;
        };
        let result = self.gateway.update_lead_status(lead_id, target).await;
        self.settle_transition(pending, result)
    }

    /// Reverses the last confirmed user transition, at most once.
    pub async fn undo_last(&mut self) -> TransitionOutcome {
        let Some(pending) = self.begin_undo() else {
            return TransitionOutcome::Skipped;
        };
        let result = self
            .gateway
            .update_lead_status(pending.lead_id(), pending.to())
            .await;
        self.settle_transition(pending, result)
    }

    /// Opens the detail view for a lead.
    ///
    /// The first open of an unread lead marks it read locally and returns
    /// `DetailOpen::ReceiptDue`; the host sends the receipt whenever it likes.
    pub fn open_detail(&mut self, lead_id: LeadId) -> DetailOpen {
        let Some(lead) = self.board.get(lead_id) else {
            debug!("event=detail_open module=board status=skipped reason=unknown_lead lead_id={lead_id}");
            return DetailOpen::UnknownLead;
        };
        self.detail = Some(DetailView {
            lead_id,
            status: lead.status,
            notes: lead.notes.clone(),
        });

        if self.board.mark_read(lead_id) {
            DetailOpen::ReceiptDue(lead_id)
        } else {
            DetailOpen::Opened
        }
    }

    /// Tells the gateway a lead was read.
    ///
    /// Failures are logged only; the local read flag is never rolled back.
    pub async fn send_read_receipt(&self, lead_id: LeadId) {
        match self.gateway.mark_lead_read(lead_id).await {
            Ok(()) => debug!("event=lead_mark_read module=board status=ok lead_id={lead_id}"),
            Err(err) => warn!(
                "event=lead_mark_read module=board status=error lead_id={} error={}",
                lead_id, err
            ),
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Persists notes for the lead in the open detail view.
    ///
    /// Notes are stored verbatim; all-whitespace notes are stored as `None`.
    /// Returns `false` when no detail view is open or the gateway rejected
    /// the write.
    pub async fn save_notes(&mut self, notes: &str) -> bool {
        let Some(lead_id) = self.detail.as_ref().map(|detail| detail.lead_id) else {
            return false;
        };
        let notes = (!notes.trim().is_empty()).then(|| notes.to_string());

        match self.gateway.update_lead_notes(lead_id, notes.clone()).await {
            Ok(()) => {
                info!("event=lead_notes module=board status=ok lead_id={lead_id}");
                self.board.set_notes(lead_id, notes.clone());
                if let Some(detail) = self.detail.as_mut().filter(|d| d.lead_id == lead_id) {
                    detail.notes = notes;
                }
                self.notices.push_back(Notice::NotesSaved { lead_id });
                true
            }
            Err(err) => {
                warn!(
                    "event=lead_notes module=board status=error lead_id={} error={}",
                    lead_id, err
                );
                self.notices.push_back(Notice::NotesFailed {
                    lead_id,
                    message: err.to_string(),
                });
                false
            }
        }
    }

    fn start(&mut self, command: MoveLead, origin: TransitionOrigin) -> Option<PendingTransition> {
        if !command.apply(&mut self.board) {
            debug!(
                "event=lead_transition module=board status=skipped lead_id={} to={}",
                command.lead_id, command.to
            );
            return None;
        }
        self.sync_detail_status(command.lead_id);
        Some(PendingTransition {
            command,
            origin,
            started_at: Instant::now(),
        })
    }

    fn sync_detail_status(&mut self, lead_id: LeadId) {
        let Some(detail) = self.detail.as_mut().filter(|d| d.lead_id == lead_id) else {
            return;
        };
        if let Some((status, _)) = self.board.locate(lead_id) {
            detail.status = status;
        }
    }
}
