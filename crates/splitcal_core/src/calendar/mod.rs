//! Read-only calendar derivations over the event list.
//!
//! # Responsibility
//! - Build month/week day grids annotated with event markers.
//! - Project a bounded, time-ordered upcoming preview.
//! - Track the reference date and view mode the grid is built from.
//!
//! # Invariants
//! - Every function here is pure: same inputs, same output, no hidden state.

pub mod grid;
pub mod upcoming;
pub mod view;
