//! Core logic for the lead pipeline board.
//! This crate is the single source of truth for board invariants.

pub mod board;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;

pub use board::controller::{
    BoardController, DetailOpen, DetailView, Notice, PendingTransition, TransitionOrigin,
    TransitionOutcome,
};
pub use board::filter::{filter_board, DateRange, FilterSpec, FilteredBoard};
pub use board::store::LeadBoard;
pub use board::undo::{UndoEntry, UndoMemory};
pub use config::{BoardConfig, ConfigError};
pub use gateway::{GatewayError, GatewayResult, LeadGateway, SqliteLeadGateway};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::lead::{Lead, LeadId, LeadStatus, LeadValidationError, LinkedListing};
pub use repo::lead_repo::{
    LeadListQuery, LeadRepository, RepoError, RepoResult, SqliteLeadRepository,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
