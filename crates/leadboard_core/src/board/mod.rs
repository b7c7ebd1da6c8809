//! Kanban board core: record store, filtering, transitions and undo.
//!
//! # Responsibility
//! - Keep the authoritative lead partition in memory.
//! - Derive filtered views without touching the source of truth.
//! - Execute bucket transitions with optimistic apply and rollback.
//!
//! # Invariants
//! - The partition is total and disjoint at every await point.
//! - The lead count is conserved by every transition.

pub mod command;
pub mod controller;
pub mod filter;
pub mod store;
pub mod undo;
