//! Core domain logic for SplitCal.
//! This crate owns the on-device calendar store and the contracts the
//! expense-splitting half consumes from its hosted backend.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod runtime;
pub mod service;
pub mod storage;
pub mod store;

pub use calendar::grid::{build_grid, CalendarDay, DayMarker, GridOptions, ViewMode};
pub use calendar::upcoming::upcoming_events;
pub use calendar::view::CalendarView;
pub use config::{CalendarConfig, RemoteCollections};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{
    format_event_date, parse_event_date, CalendarEvent, EventColor, EventId, EventPatch,
    NewEvent, PALETTE,
};
pub use runtime::mailbox::{CalendarHandle, CalendarWorker, MailboxError};
pub use service::clock::{Clock, ManualClock, SystemClock};
pub use service::event_service::{EventRejection, EventResult, EventService};
pub use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError};
pub use store::event_store::EventStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
