//! Flutter-facing bindings for the splitcal core.

pub mod api;
