//! Calendar domain model.
//!
//! # Responsibility
//! - Define the canonical calendar event record and its wire shape.
//! - Provide creation drafts and partial-update patches.
//!
//! # Invariants
//! - Every stored event is identified by a stable `EventId`.
//! - Colors are restricted to the fixed eight-entry palette.

pub mod event;
