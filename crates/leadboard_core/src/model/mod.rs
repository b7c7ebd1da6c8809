//! Domain model for pipeline leads.
//!
//! # Responsibility
//! - Define canonical data structures used by the board and persistence.
//!
//! # Invariants
//! - Every lead is identified by a stable `LeadId`.
//! - Every lead sits in exactly one `LeadStatus` bucket.

pub mod lead;
