//! Local SQLite implementation of the lead gateway.
//!
//! # Responsibility
//! - Serve the board's remote operations from a SQLite connection.
//! - Flatten repository errors into gateway failure messages.

use crate::board::store::LeadBoard;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::gateway::{GatewayError, GatewayResult, LeadGateway};
use crate::model::lead::{LeadId, LeadStatus};
use crate::repo::lead_repo::{LeadRepository, RepoError, SqliteLeadRepository};
use async_trait::async_trait;
use log::error;
use rusqlite::Connection;
use std::path::Path;

/// Gateway answering board calls from a local database.
pub struct SqliteLeadGateway {
    conn: Connection,
}

impl SqliteLeadGateway {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Repository view over the gateway connection, for seeding and inspection.
    pub fn repo(&self) -> SqliteLeadRepository<'_> {
        SqliteLeadRepository::new(&self.conn)
    }
}

fn to_gateway_error(operation: &'static str, err: RepoError) -> GatewayError {
    error!("event=gateway_call module=gateway status=error op={operation} error={err}");
    GatewayError::new(format!("{operation} failed: {err}"))
}

#[async_trait(?Send)]
impl LeadGateway for SqliteLeadGateway {
    async fn load_leads_partitioned(&self) -> GatewayResult<LeadBoard> {
        self.repo()
            .load_board()
            .map_err(|err| to_gateway_error("load_leads_partitioned", err))
    }

    async fn update_lead_status(&self, lead_id: LeadId, status: LeadStatus) -> GatewayResult<()> {
        self.repo()
            .update_status(lead_id, status)
            .map_err(|err| to_gateway_error("update_lead_status", err))
    }

    async fn update_lead_notes(&self, lead_id: LeadId, notes: Option<String>) -> GatewayResult<()> {
        self.repo()
            .update_notes(lead_id, notes.as_deref())
            .map_err(|err| to_gateway_error("update_lead_notes", err))
    }

    async fn mark_lead_read(&self, lead_id: LeadId) -> GatewayResult<()> {
        self.repo()
            .mark_read(lead_id)
            .map_err(|err| to_gateway_error("mark_lead_read", err))
    }
}
