//! Event store.
//!
//! # Responsibility
//! - Own the canonical ordered list of calendar events.
//! - Load it once from durable storage and persist whole-list replacements.
//!
//! # Invariants
//! - The in-memory list changes only after a successful durable write.
//! - Storage and decoding failures are logged and never surfaced to callers.
//! - Event ids are unique within the list.

use crate::model::event::{CalendarEvent, EventId};
use crate::storage::KeyValueStore;
use log::{error, info, warn};
use std::collections::HashSet;
use std::time::Instant;

/// Single owner of the calendar event list.
pub struct EventStore<S: KeyValueStore> {
    storage: S,
    storage_key: String,
    events: Vec<CalendarEvent>,
    loaded: bool,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Creates an empty, not-yet-loaded store over `storage`.
    pub fn new(storage: S, storage_key: impl Into<String>) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
            events: Vec::new(),
            loaded: false,
        }
    }

    /// Reads the durable collection into memory.
    ///
    /// An absent key loads as empty. Read or decode failures are logged and
    /// also leave the list empty. Always marks the store as loaded.
    pub fn load(&mut self) {
        let started_at = Instant::now();
        self.events = match self.storage.get(&self.storage_key) {
            Ok(None) => {
                info!("event=events_load module=store status=ok source=empty count=0");
                Vec::new()
            }
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CalendarEvent>>(&raw) {
                Ok(events) => {
                    let events = dedupe_ids(events);
                    info!(
                        "event=events_load module=store status=ok source=storage count={} duration_ms={}",
                        events.len(),
                        started_at.elapsed().as_millis()
                    );
                    events
                }
                Err(err) => {
                    error!(
                        "event=events_load module=store status=error error_code=decode_failed error={err}"
                    );
                    Vec::new()
                }
            },
            Err(err) => {
                error!(
                    "event=events_load module=store status=error error_code=read_failed error={err}"
                );
                Vec::new()
            }
        };
        self.loaded = true;
    }

    /// Whether `load` has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Writes `new_events` as the whole stored value, then adopts it.
    ///
    /// Returns `true` when the write succeeded. On failure the previous
    /// in-memory list is kept; the write is not retried.
    pub fn persist(&mut self, new_events: Vec<CalendarEvent>) -> bool {
        let raw = match serde_json::to_string(&new_events) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=events_persist module=store status=error error_code=encode_failed error={err}"
                );
                return false;
            }
        };

        if let Err(err) = self.storage.set(&self.storage_key, &raw) {
            error!(
                "event=events_persist module=store status=error error_code=write_failed count={} error={err}",
                new_events.len()
            );
            return false;
        }

        info!(
            "event=events_persist module=store status=ok count={}",
            new_events.len()
        );
        self.events = new_events;
        true
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn get_by_id(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|event| &event.id == id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get_by_id(id).is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn dedupe_ids(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut seen = HashSet::new();
    let before = events.len();
    let unique: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|event| seen.insert(event.id.clone()))
        .collect();
    if unique.len() != before {
        warn!(
            "event=events_load module=store status=skip reason=duplicate_id dropped={}",
            before - unique.len()
        );
    }
    unique
}
