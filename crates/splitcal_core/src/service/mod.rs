//! Calendar use-case services.
//!
//! # Responsibility
//! - Layer create/update/delete/lookup on top of the event store.
//! - Keep UI/FFI callers decoupled from storage details.

pub mod clock;
pub mod event_service;
pub mod id_gen;
