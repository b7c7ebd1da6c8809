//! Persistence collaborator contract for the board.
//!
//! # Responsibility
//! - Name the four remote operations the board core depends on.
//! - Carry expected failures as values, never as panics.
//!
//! # Invariants
//! - Futures are `?Send`: the board runs on one cooperative thread.
//! - `Err` means the remote side rejected or never applied the change.

use crate::board::store::LeadBoard;
use crate::model::lead::{LeadId, LeadStatus};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteLeadGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for GatewayError {}

/// Remote operations consumed by the board controller.
#[async_trait(?Send)]
pub trait LeadGateway {
    /// Initial load, called once when the board mounts.
    async fn load_leads_partitioned(&self) -> GatewayResult<LeadBoard>;
    async fn update_lead_status(&self, lead_id: LeadId, status: LeadStatus) -> GatewayResult<()>;
    async fn update_lead_notes(&self, lead_id: LeadId, notes: Option<String>) -> GatewayResult<()>;
    async fn mark_lead_read(&self, lead_id: LeadId) -> GatewayResult<()>;
}
