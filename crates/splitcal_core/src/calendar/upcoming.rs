//! Upcoming-events projector.

use crate::model::event::CalendarEvent;
use chrono::{DateTime, Utc};

/// Events at or after `now`, ascending by date, at most `limit` entries.
///
/// The sort is stable, so events sharing a timestamp keep list order.
pub fn upcoming_events(
    events: &[CalendarEvent],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<&CalendarEvent> {
    let mut upcoming: Vec<&CalendarEvent> =
        events.iter().filter(|event| event.date >= now).collect();
    upcoming.sort_by_key(|event| event.date);
    upcoming.truncate(limit);
    upcoming
}
