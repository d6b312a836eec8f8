//! Time-based event id generation.
//!
//! # Invariants
//! - Ids are decimal epoch milliseconds.
//! - Each generated id is strictly greater than every id generated or
//!   observed before it, even when the clock stalls or moves backwards.
//! - Once the numeric range is exhausted, ids fall back to
//!   `<now_ms>-<uuid>`, which never parse as numbers.

use crate::model::event::EventId;
use chrono::{DateTime, Utc};
use log::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an existing id so later ids never collide with it.
    pub fn observe(&mut self, id: &EventId) {
        if let Some(value) = id.as_millis() {
            self.last = Some(self.last.map_or(value, |last| last.max(value)));
        }
    }

    /// Returns a fresh id for an event created at `now`.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> EventId {
        let now_ms = now.timestamp_millis();
        let next = match self.last {
            Some(last) if now_ms <= last => last.checked_add(1),
            _ => Some(now_ms),
        };
        match next {
            Some(next) => {
                self.last = Some(next);
                EventId::new(next.to_string())
            }
            None => {
                warn!("event=id_generate module=service status=skip reason=numeric_range_exhausted");
                EventId::new(format!("{now_ms}-{}", Uuid::new_v4().simple()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IdGenerator;
    use crate::model::event::EventId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn ids_stay_monotonic_when_clock_stalls() {
        let now = Utc.timestamp_millis_opt(1_710_493_200_000).unwrap();
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_at(now).as_str(), "1710493200000");
        assert_eq!(ids.next_at(now).as_str(), "1710493200001");
    }

    #[test]
    fn observed_ids_push_generation_forward() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut ids = IdGenerator::new();
        ids.observe(&EventId::from("5000"));
        ids.observe(&EventId::from("legacy-id"));
        assert_eq!(ids.next_at(now).as_str(), "5001");
    }

    #[test]
    fn exhausted_numeric_range_yields_distinct_fallback_ids() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut ids = IdGenerator::new();
        ids.observe(&EventId::from(i64::MAX.to_string()));

        let first = ids.next_at(now);
        let second = ids.next_at(now);
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("1000-"));
        assert_eq!(first.as_millis(), None);
    }
}
