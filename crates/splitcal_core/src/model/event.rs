//! Calendar event model.
//!
//! # Responsibility
//! - Define `CalendarEvent` and its JSON wire representation.
//! - Provide `NewEvent` (creation draft) and `EventPatch` (partial update).
//!
//! # Invariants
//! - `id` is stable for the lifetime of the event.
//! - `date` keeps full timestamp precision; day bucketing happens in views.
//! - `EventPatch::apply` is total: every attribute is merged explicitly.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque event identifier.
///
/// Freshly created ids are decimal epoch milliseconds, but ids read back
/// from storage are treated as arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value when the id was produced by the time-based generator.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Fixed event color palette, serialized as hex tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventColor {
    #[default]
    Blue,
    Red,
    Green,
    Orange,
    Purple,
    Pink,
    Indigo,
    Teal,
}

/// Palette in display order. The first entry is the default color.
pub const PALETTE: [EventColor; 8] = [
    EventColor::Blue,
    EventColor::Red,
    EventColor::Green,
    EventColor::Orange,
    EventColor::Purple,
    EventColor::Pink,
    EventColor::Indigo,
    EventColor::Teal,
];

impl EventColor {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#007AFF",
            Self::Red => "#FF3B30",
            Self::Green => "#34C759",
            Self::Orange => "#FF9500",
            Self::Purple => "#AF52DE",
            Self::Pink => "#FF2D55",
            Self::Indigo => "#5856D6",
            Self::Teal => "#00C7BE",
        }
    }
}

impl Display for EventColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

impl FromStr for EventColor {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        PALETTE
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ColorParseError(trimmed.to_string()))
    }
}

impl TryFrom<String> for EventColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventColor> for String {
    fn from(value: EventColor) -> Self {
        value.hex().to_string()
    }
}

/// Color token outside the fixed palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "color `{}` is not in the event palette", self.0)
    }
}

impl Error for ColorParseError {}

/// Date string that matches none of the accepted event date shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDateParseError(pub String);

impl Display for EventDateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid event date `{}`; expected RFC 3339, YYYY-MM-DDTHH:MM[:SS] or YYYY-MM-DD",
            self.0
        )
    }
}

impl Error for EventDateParseError {}

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an event date.
///
/// Accepts full RFC 3339, naive date-times (taken as UTC) and bare dates
/// (midnight UTC).
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, EventDateParseError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EventDateParseError(trimmed.to_string()))
}

/// Formats an event date the way it is persisted (`2024-03-15T09:00:00.000Z`).
pub fn format_event_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod event_date {
    use super::{format_event_date, parse_event_date};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_event_date(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_event_date(&raw).map_err(serde::de::Error::custom)
    }
}

fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Off-palette tokens decode as the default color so one stray record
/// never fails the whole list.
fn color_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EventColor, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(EventColor::default());
    };
    Ok(raw.parse().unwrap_or_else(|_| {
        warn!("event=event_decode module=model status=skip reason=unknown_color");
        EventColor::default()
    }))
}

fn bool_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// Canonical calendar event record.
///
/// Serialized as `id, title, description, date, time, color, location?, reminder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    /// Full timestamp; only the calendar day matters for grid bucketing.
    #[serde(with = "event_date")]
    pub date: DateTime<Utc>,
    /// Free-form display time such as `12:00`. Never validated.
    #[serde(default, deserialize_with = "string_or_null")]
    pub time: String,
    #[serde(default, deserialize_with = "color_or_null")]
    pub color: EventColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stored state only; nothing schedules a notification from it.
    #[serde(default, deserialize_with = "bool_or_null")]
    pub reminder: bool,
}

impl CalendarEvent {
    /// Calendar day of this event as seen from `offset`.
    pub fn calendar_day(&self, offset: FixedOffset) -> NaiveDate {
        self.date.with_timezone(&offset).date_naive()
    }
}

/// Creation draft: every event attribute except `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub time: String,
    /// `None` selects the first palette entry.
    pub color: Option<EventColor>,
    pub location: Option<String>,
    pub reminder: bool,
}

impl NewEvent {
    /// Time preset used by the creation form.
    pub const DEFAULT_TIME: &'static str = "12:00";

    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            time: Self::DEFAULT_TIME.to_string(),
            color: None,
            location: None,
            reminder: false,
        }
    }

    /// Returns whether the title is non-empty after trimming.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Materializes the draft under `id`.
    ///
    /// Trims text fields; a blank location is stored as absent.
    pub fn into_event(self, id: EventId) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: self.date,
            time: self.time,
            color: self.color.unwrap_or_default(),
            location: normalize_location(self.location),
            reminder: self.reminder,
        }
    }
}

/// Partial update. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub color: Option<EventColor>,
    /// `Some(None)` clears the location.
    pub location: Option<Option<String>>,
    pub reminder: Option<bool>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns whether the patch would leave a blank title behind.
    pub fn blanks_title(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
    }

    /// Merges this patch over `event`, field by field.
    pub fn apply(&self, event: &CalendarEvent) -> CalendarEvent {
        CalendarEvent {
            id: event.id.clone(),
            title: self.title.clone().unwrap_or_else(|| event.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| event.description.clone()),
            date: self.date.unwrap_or(event.date),
            time: self.time.clone().unwrap_or_else(|| event.time.clone()),
            color: self.color.unwrap_or(event.color),
            location: match &self.location {
                Some(location) => location.clone(),
                None => event.location.clone(),
            },
            reminder: self.reminder.unwrap_or(event.reminder),
        }
    }
}

pub(crate) fn normalize_location(location: Option<String>) -> Option<String> {
    location
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
