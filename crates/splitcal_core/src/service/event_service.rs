//! Calendar event lifecycle service.
//!
//! # Responsibility
//! - Provide add/update/delete/lookup over the event store.
//! - Expose grid and upcoming projections over the current list.
//!
//! # Invariants
//! - Every successful mutation persists the full list before it is visible.
//! - New events are appended, so list order is creation order.
//! - A blank title is rejected on create and on update.
//! - Storage failures are logged by the store and never returned here.

use crate::calendar::grid::{build_grid, events_on_day, CalendarDay, ViewMode};
use crate::calendar::upcoming::upcoming_events;
use crate::config::CalendarConfig;
use crate::model::event::{normalize_location, CalendarEvent, EventId, EventPatch, NewEvent};
use crate::service::clock::{Clock, SystemClock};
use crate::service::id_gen::IdGenerator;
use crate::storage::KeyValueStore;
use crate::store::event_store::EventStore;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EventResult<T> = Result<T, EventRejection>;

/// Reason a lifecycle operation did not proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRejection {
    /// Title is empty after trimming.
    EmptyTitle,
    /// No event with this id exists.
    NotFound(EventId),
}

impl Display for EventRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title must not be blank"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
        }
    }
}

impl Error for EventRejection {}

/// Use-case facade over one `EventStore`.
pub struct EventService<S: KeyValueStore, C: Clock = SystemClock> {
    store: EventStore<S>,
    config: CalendarConfig,
    clock: C,
    ids: IdGenerator,
}

impl<S: KeyValueStore> EventService<S, SystemClock> {
    /// Creates a service on the wall clock. Call `load` before use.
    pub fn new(storage: S, config: CalendarConfig) -> Self {
        Self::with_clock(storage, config, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> EventService<S, C> {
    pub fn with_clock(storage: S, config: CalendarConfig, clock: C) -> Self {
        let store = EventStore::new(storage, config.storage_key.clone());
        Self {
            store,
            config,
            clock,
            ids: IdGenerator::new(),
        }
    }

    /// Loads the durable list and seeds id generation from it.
    pub fn load(&mut self) {
        self.store.load();
        for event in self.store.events() {
            self.ids.observe(&event.id);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn events(&self) -> &[CalendarEvent] {
        self.store.events()
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    /// Creates an event with a fresh id and appends it.
    ///
    /// # Errors
    /// - `EventRejection::EmptyTitle` when the trimmed title is empty.
    ///
    /// Returns the created event. If the durable write fails the event is
    /// not added; that is visible only through a later read.
    pub fn add_event(&mut self, draft: NewEvent) -> EventResult<CalendarEvent> {
        if !draft.has_title() {
            info!("event=event_add module=service status=skip reason=empty_title");
            return Err(EventRejection::EmptyTitle);
        }

        let now = self.clock.now();
        let mut id = self.ids.next_at(now);
        while self.store.contains(&id) {
            id = self.ids.next_at(now);
        }

        let event = draft.into_event(id);
        let mut next = self.store.events().to_vec();
        next.push(event.clone());
        self.store.persist(next);
        Ok(event)
    }

    /// Merges `patch` over the event with `id`.
    ///
    /// # Errors
    /// - `EventRejection::EmptyTitle` when the patch sets a blank title.
    /// - `EventRejection::NotFound` when `id` is absent; nothing is written.
    pub fn update_event(&mut self, id: &EventId, patch: EventPatch) -> EventResult<CalendarEvent> {
        if patch.blanks_title() {
            info!("event=event_update module=service status=skip reason=empty_title");
            return Err(EventRejection::EmptyTitle);
        }
        let Some(current) = self.store.get_by_id(id) else {
            info!("event=event_update module=service status=skip reason=not_found");
            return Err(EventRejection::NotFound(id.clone()));
        };

        let patch = EventPatch {
            title: patch.title.map(|title| title.trim().to_string()),
            location: patch.location.map(normalize_location),
            ..patch
        };
        let updated = patch.apply(current);
        let next = self
            .store
            .events()
            .iter()
            .map(|event| {
                if &event.id == id {
                    updated.clone()
                } else {
                    event.clone()
                }
            })
            .collect();
        self.store.persist(next);
        Ok(updated)
    }

    /// Removes the event with `id`.
    ///
    /// Returns `true` when an event was removed and the removal persisted.
    /// An unknown id performs no write.
    pub fn delete_event(&mut self, id: &EventId) -> bool {
        if !self.store.contains(id) {
            info!("event=event_delete module=service status=skip reason=not_found");
            return false;
        }
        let next = self
            .store
            .events()
            .iter()
            .filter(|event| &event.id != id)
            .cloned()
            .collect();
        self.store.persist(next)
    }

    pub fn get_event_by_id(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.store.get_by_id(id)
    }

    /// Current calendar day in the configured offset.
    pub fn today(&self) -> NaiveDate {
        self.clock
            .now()
            .with_timezone(&self.config.grid.utc_offset)
            .date_naive()
    }

    /// Every event on `day`, in list order (no marker cap).
    pub fn events_on(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        events_on_day(self.store.events(), day, self.config.grid.utc_offset)
    }

    pub fn grid(&self, reference: NaiveDate, mode: ViewMode) -> Vec<CalendarDay> {
        build_grid(
            reference,
            mode,
            self.store.events(),
            self.today(),
            &self.config.grid,
        )
    }

    pub fn upcoming(&self) -> Vec<&CalendarEvent> {
        upcoming_events(
            self.store.events(),
            self.clock.now(),
            self.config.upcoming_limit,
        )
    }
}
