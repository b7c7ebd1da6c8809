#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use leadboard_core::{
    GatewayError, GatewayResult, Lead, LeadBoard, LeadGateway, LeadId, LeadStatus, LinkedListing,
};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Gateway call observed by `ScriptedGateway`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load,
    UpdateStatus(LeadId, LeadStatus),
    UpdateNotes(LeadId, Option<String>),
    MarkRead(LeadId),
}

/// In-memory gateway with scripted answers. Unscripted calls succeed.
#[derive(Default)]
pub struct ScriptedGateway {
    load_result: RefCell<Option<GatewayResult<LeadBoard>>>,
    status_results: RefCell<VecDeque<GatewayResult<()>>>,
    notes_results: RefCell<VecDeque<GatewayResult<()>>>,
    read_results: RefCell<VecDeque<GatewayResult<()>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(board: LeadBoard) -> Self {
        let gateway = Self::new();
        *gateway.load_result.borrow_mut() = Some(Ok(board));
        gateway
    }

    pub fn fail_load(&self, message: &str) {
        *self.load_result.borrow_mut() = Some(Err(GatewayError::new(message)));
    }

    pub fn fail_next_status(&self, message: &str) {
        self.status_results
            .borrow_mut()
            .push_back(Err(GatewayError::new(message)));
    }

    pub fn succeed_next_status(&self) {
        self.status_results.borrow_mut().push_back(Ok(()));
    }

    pub fn fail_next_notes(&self, message: &str) {
        self.notes_results
            .borrow_mut()
            .push_back(Err(GatewayError::new(message)));
    }

    pub fn fail_next_read(&self, message: &str) {
        self.read_results
            .borrow_mut()
            .push_back(Err(GatewayError::new(message)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::UpdateStatus(..)))
            .count()
    }

    fn next(queue: &RefCell<VecDeque<GatewayResult<()>>>) -> GatewayResult<()> {
        queue.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait(?Send)]
impl LeadGateway for ScriptedGateway {
    async fn load_leads_partitioned(&self) -> GatewayResult<LeadBoard> {
        self.calls.borrow_mut().push(Call::Load);
        self.load_result
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(LeadBoard::new()))
    }

    async fn update_lead_status(&self, lead_id: LeadId, status: LeadStatus) -> GatewayResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateStatus(lead_id, status));
        Self::next(&self.status_results)
    }

    async fn update_lead_notes(&self, lead_id: LeadId, notes: Option<String>) -> GatewayResult<()> {
        self.calls.borrow_mut().push(Call::UpdateNotes(lead_id, notes));
        Self::next(&self.notes_results)
    }

    async fn mark_lead_read(&self, lead_id: LeadId) -> GatewayResult<()> {
        self.calls.borrow_mut().push(Call::MarkRead(lead_id));
        Self::next(&self.read_results)
    }
}

/// Fixed "now" used across board tests: 2026-10-18 12:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

pub fn lead(name: &str, status: LeadStatus) -> Lead {
    Lead::new(name, format!("{}@example.com", name.to_lowercase()), fixed_now().timestamp_millis())
        .in_status(status)
}

pub fn listing(id: &str, title: &str) -> LinkedListing {
    LinkedListing {
        id: id.to_string(),
        title: title.to_string(),
        price_cents: Some(4_500_000),
    }
}
