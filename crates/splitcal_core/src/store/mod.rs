//! Canonical in-memory event list and its durable mirror.
//!
//! # See also
//! - `storage` for the key-value backends the store writes through.

pub mod event_store;
