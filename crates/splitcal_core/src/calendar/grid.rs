//! Calendar grid builder.
//!
//! # Invariants
//! - Month grids start on `week_start` on-or-before the 1st and end on the
//!   last weekday on-or-after the month's last day (length is a multiple of 7).
//! - Week grids are exactly 7 days.
//! - Events are bucketed by calendar day only; `time` is ignored.

use crate::model::event::{CalendarEvent, EventColor, EventId};
use chrono::{Datelike, Duration, FixedOffset, Months, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Markers rendered per day before collapsing the rest into a count.
pub const DEFAULT_MAX_MARKERS: usize = 3;

/// Grid layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ViewModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            other => Err(ViewModeParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModeParseError(pub String);

impl Display for ViewModeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported view mode `{}`; expected month|week", self.0)
    }
}

impl Error for ViewModeParseError {}

/// Layout options for grid derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub week_start: Weekday,
    pub max_markers: usize,
    /// Offset used to map event timestamps onto calendar days.
    pub utc_offset: FixedOffset,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            max_markers: DEFAULT_MAX_MARKERS,
            utc_offset: Utc.fix(),
        }
    }
}

/// One event dot on a day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMarker {
    pub event_id: EventId,
    pub color: EventColor,
}

/// One rendered day of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Day belongs to a neighbouring month (month mode only).
    pub is_other_month: bool,
    pub is_today: bool,
    /// First `max_markers` events of the day, in list order.
    pub markers: Vec<DayMarker>,
    /// Total events on this day, including those not in `markers`.
    pub event_count: usize,
}

impl CalendarDay {
    /// Events hidden behind the "+N" indicator.
    pub fn overflow(&self) -> usize {
        self.event_count.saturating_sub(self.markers.len())
    }

    pub fn first_event_id(&self) -> Option<&EventId> {
        self.markers.first().map(|marker| &marker.event_id)
    }
}

/// First day of the week containing `day`.
pub fn start_of_week(day: NaiveDate, week_start: Weekday) -> NaiveDate {
    let since_start =
        (7 + day.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    day - Duration::days(i64::from(since_start))
}

/// Last day of the week containing `day`.
pub fn end_of_week(day: NaiveDate, week_start: Weekday) -> NaiveDate {
    start_of_week(day, week_start) + Duration::days(6)
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.day0()))
}

pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    let first = first_day_of_month(day);
    match first.checked_add_months(Months::new(1)) {
        Some(next_first) => next_first - Duration::days(1),
        None => NaiveDate::MAX,
    }
}

/// Inclusive first and last day displayed for `reference` in `mode`.
pub fn grid_span(reference: NaiveDate, mode: ViewMode, week_start: Weekday) -> (NaiveDate, NaiveDate) {
    match mode {
        ViewMode::Month => (
            start_of_week(first_day_of_month(reference), week_start),
            end_of_week(last_day_of_month(reference), week_start),
        ),
        ViewMode::Week => (
            start_of_week(reference, week_start),
            end_of_week(reference, week_start),
        ),
    }
}

/// Builds the day grid for `reference`.
///
/// Events keep their list order inside a day. Only the first
/// `options.max_markers` become markers; `event_count` keeps the total.
pub fn build_grid(
    reference: NaiveDate,
    mode: ViewMode,
    events: &[CalendarEvent],
    today: NaiveDate,
    options: &GridOptions,
) -> Vec<CalendarDay> {
    let (start, end) = grid_span(reference, mode, options.week_start);

    let mut buckets: HashMap<NaiveDate, Vec<&CalendarEvent>> = HashMap::new();
    for event in events {
        let day = event.calendar_day(options.utc_offset);
        if day >= start && day <= end {
            buckets.entry(day).or_default().push(event);
        }
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|date| {
            let day_events = buckets.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            CalendarDay {
                date,
                is_other_month: mode == ViewMode::Month
                    && (date.year(), date.month()) != (reference.year(), reference.month()),
                is_today: date == today,
                markers: day_events
                    .iter()
                    .take(options.max_markers)
                    .map(|event| DayMarker {
                        event_id: event.id.clone(),
                        color: event.color,
                    })
                    .collect(),
                event_count: day_events.len(),
            }
        })
        .collect()
}

/// All events falling on `day`, in list order.
pub fn events_on_day<'a>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    utc_offset: FixedOffset,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|event| event.calendar_day(utc_offset) == day)
        .collect()
}
