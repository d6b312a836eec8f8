//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose calendar use cases to Dart via FRB as flat, string-typed DTOs.
//! - Route every calendar call through one process-wide mailbox worker.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Dates cross the boundary as RFC 3339 strings, colors as hex tokens.
//! - The worker is started lazily on first use and lives for the process.

use chrono::NaiveDate;
use log::error;
use splitcal_core::model::event::parse_event_date;
use splitcal_core::{
    core_version as core_version_inner, format_event_date, init_logging as init_logging_inner,
    ping as ping_inner, CalendarConfig, CalendarDay, CalendarEvent, CalendarHandle,
    CalendarView, CalendarWorker, EventColor, EventId, EventPatch, EventService, NewEvent,
    SqliteKeyValueStore, ViewMode,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const CALENDAR_DB_FILE_NAME: &str = "splitcal_calendar.sqlite3";
const CALENDAR_DB_PATH_ENV: &str = "SPLITCAL_DB_PATH";
static CALENDAR_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CALENDAR_WORKER: OnceLock<Result<CalendarWorker, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Calendar event as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub date: String,
    pub time: String,
    /// Hex color token such as `#007AFF`.
    pub color: String,
    pub location: Option<String>,
    pub reminder: bool,
}

/// Action response envelope for calendar mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Event after the operation, when one exists.
    pub event: Option<CalendarEventItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EventActionResponse {
    fn success(message: impl Into<String>, event: Option<CalendarEventItem>) -> Self {
        Self {
            ok: true,
            event,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            event: None,
            message: message.into(),
        }
    }
}

/// List response envelope for event list and upcoming queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListResponse {
    pub ok: bool,
    pub items: Vec<CalendarEventItem>,
    pub message: String,
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub is_other_month: bool,
    pub is_today: bool,
    /// Marker colors in list order, at most the configured marker count.
    pub marker_colors: Vec<String>,
    /// Id of the first event of the day; tapping a cell opens it.
    pub first_event_id: Option<String>,
    pub event_count: u32,
    /// Count behind the "+N" indicator.
    pub overflow: u32,
}

/// Grid response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGridResponse {
    pub ok: bool,
    /// Header label such as `March 2024`.
    pub title: String,
    pub days: Vec<CalendarDayItem>,
    pub message: String,
}

impl CalendarGridResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            title: String::new(),
            days: Vec::new(),
            message: message.into(),
        }
    }
}

/// Creates a calendar event.
///
/// Input semantics:
/// - `date`: RFC 3339 timestamp, naive `YYYY-MM-DDTHH:MM[:SS]` (UTC) or bare
///   `YYYY-MM-DD`.
/// - `time`: display time; `None` uses `12:00`.
/// - `color`: palette hex token; `None` uses the first palette color.
///
/// # FFI contract
/// - Sync call, DB-backed execution through the calendar worker.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_add_event(
    title: String,
    description: String,
    date: String,
    time: Option<String>,
    color: Option<String>,
    location: Option<String>,
    reminder: bool,
) -> EventActionResponse {
    let date = match parse_event_date(&date) {
        Ok(date) => date,
        Err(err) => return EventActionResponse::failure(format!("calendar_add_event failed: {err}")),
    };
    let color = match parse_color(color) {
        Ok(color) => color,
        Err(err) => return EventActionResponse::failure(format!("calendar_add_event failed: {err}")),
    };

    let mut draft = NewEvent::new(title, date);
    draft.description = description;
    if let Some(time) = time {
        draft.time = time;
    }
    draft.color = color;
    draft.location = location;
    draft.reminder = reminder;

    match with_calendar(|calendar| calendar.add_event(draft)) {
        Ok(Ok(event)) => EventActionResponse::success("Event created.", Some(to_event_item(&event))),
        Ok(Err(rejection)) => {
            EventActionResponse::failure(format!("calendar_add_event failed: {rejection}"))
        }
        Err(err) => EventActionResponse::failure(format!("calendar_add_event failed: {err}")),
    }
}

/// Partially updates a calendar event.
///
/// `None` leaves an attribute untouched. For `location`, `Some("")` clears it.
///
/// # FFI contract
/// - Sync call, DB-backed execution through the calendar worker.
/// - Never panics.
#[allow(clippy::too_many_arguments)]
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_update_event(
    id: String,
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    time: Option<String>,
    color: Option<String>,
    location: Option<String>,
    reminder: Option<bool>,
) -> EventActionResponse {
    let date = match date.as_deref().map(parse_event_date).transpose() {
        Ok(date) => date,
        Err(err) => {
            return EventActionResponse::failure(format!("calendar_update_event failed: {err}"))
        }
    };
    let color = match parse_color(color) {
        Ok(color) => color,
        Err(err) => {
            return EventActionResponse::failure(format!("calendar_update_event failed: {err}"))
        }
    };

    let patch = EventPatch {
        title,
        description,
        date,
        time,
        color,
        location: location.map(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }),
        reminder,
    };

    match with_calendar(|calendar| calendar.update_event(EventId::new(id.trim()), patch)) {
        Ok(Ok(event)) => EventActionResponse::success("Event updated.", Some(to_event_item(&event))),
        Ok(Err(rejection)) => {
            EventActionResponse::failure(format!("calendar_update_event failed: {rejection}"))
        }
        Err(err) => EventActionResponse::failure(format!("calendar_update_event failed: {err}")),
    }
}

/// Deletes a calendar event. Deleting an unknown id is not an error.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_delete_event(id: String) -> EventActionResponse {
    match with_calendar(|calendar| calendar.delete_event(EventId::new(id.trim()))) {
        Ok(true) => EventActionResponse::success("Event deleted.", None),
        Ok(false) => EventActionResponse::success("Nothing to delete.", None),
        Err(err) => EventActionResponse::failure(format!("calendar_delete_event failed: {err}")),
    }
}

/// Looks up one event; `None` when absent or when the calendar is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_get_event(id: String) -> Option<CalendarEventItem> {
    match with_calendar(|calendar| calendar.get_event_by_id(EventId::new(id.trim()))) {
        Ok(event) => event.as_ref().map(to_event_item),
        Err(err) => {
            error!("event=ffi_call module=ffi status=error op=calendar_get_event error={err}");
            None
        }
    }
}

/// Lists all events in creation order.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_list_events() -> EventListResponse {
    to_list_response(
        "calendar_list_events",
        with_calendar(|calendar| calendar.events()),
    )
}

/// Lists the next few events at or after now, soonest first.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_upcoming_events() -> EventListResponse {
    to_list_response(
        "calendar_upcoming_events",
        with_calendar(|calendar| calendar.upcoming()),
    )
}

/// Builds the month or week grid around `reference` (`YYYY-MM-DD`).
///
/// `mode` is `month` or `week` (case-insensitive).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_grid(reference: String, mode: String) -> CalendarGridResponse {
    let reference = match NaiveDate::parse_from_str(reference.trim(), "%Y-%m-%d") {
        Ok(reference) => reference,
        Err(err) => return CalendarGridResponse::failure(format!("calendar_grid failed: {err}")),
    };
    let mode = match mode.parse::<ViewMode>() {
        Ok(mode) => mode,
        Err(err) => return CalendarGridResponse::failure(format!("calendar_grid failed: {err}")),
    };

    match with_calendar(|calendar| calendar.grid(reference, mode)) {
        Ok(days) => CalendarGridResponse {
            ok: true,
            title: CalendarView::new(reference, mode).title(),
            days: days.iter().map(to_day_item).collect(),
            message: String::new(),
        },
        Err(err) => CalendarGridResponse::failure(format!("calendar_grid failed: {err}")),
    }
}

fn parse_color(raw: Option<String>) -> Result<Option<EventColor>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<EventColor>()
            .map(Some)
            .map_err(|err| err.to_string()),
    }
}

fn resolve_calendar_db_path() -> PathBuf {
    CALENDAR_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(CALENDAR_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CALENDAR_DB_FILE_NAME)
        })
        .clone()
}

fn start_calendar_worker() -> Result<CalendarWorker, String> {
    let db_path = resolve_calendar_db_path();
    let storage = SqliteKeyValueStore::open(&db_path)
        .map_err(|err| format!("calendar DB open failed: {err}"))?;
    let service = EventService::new(storage, CalendarConfig::default());
    CalendarWorker::spawn(service).map_err(|err| err.to_string())
}

fn with_calendar<T>(
    f: impl FnOnce(&CalendarHandle) -> Result<T, splitcal_core::MailboxError>,
) -> Result<T, String> {
    let worker = CALENDAR_WORKER
        .get_or_init(start_calendar_worker)
        .as_ref()
        .map_err(Clone::clone)?;
    f(&worker.handle()).map_err(|err| err.to_string())
}

fn to_list_response(
    op: &str,
    result: Result<Vec<CalendarEvent>, String>,
) -> EventListResponse {
    match result {
        Ok(events) => {
            let message = if events.is_empty() {
                "No events.".to_string()
            } else {
                format!("Found {} event(s).", events.len())
            };
            EventListResponse {
                ok: true,
                items: events.iter().map(to_event_item).collect(),
                message,
            }
        }
        Err(err) => EventListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("{op} failed: {err}"),
        },
    }
}

fn to_event_item(event: &CalendarEvent) -> CalendarEventItem {
    CalendarEventItem {
        id: event.id.to_string(),
        title: event.title.clone(),
        description: event.description.clone(),
        date: format_event_date(&event.date),
        time: event.time.clone(),
        color: event.color.hex().to_string(),
        location: event.location.clone(),
        reminder: event.reminder,
    }
}

fn to_day_item(day: &CalendarDay) -> CalendarDayItem {
    CalendarDayItem {
        date: day.date.format("%Y-%m-%d").to_string(),
        is_other_month: day.is_other_month,
        is_today: day.is_today,
        marker_colors: day
            .markers
            .iter()
            .map(|marker| marker.color.hex().to_string())
            .collect(),
        first_event_id: day.first_event_id().map(ToString::to_string),
        event_count: u32::try_from(day.event_count).unwrap_or(u32::MAX),
        overflow: u32::try_from(day.overflow()).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        calendar_add_event, calendar_delete_event, calendar_get_event, calendar_grid,
        calendar_list_events, calendar_update_event, calendar_upcoming_events, core_version,
        init_logging, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_event_applies_form_defaults() {
        let title = unique_token("ffi-add");
        let response = calendar_add_event(
            format!("  {title}  "),
            String::new(),
            "2024-03-15".to_string(),
            None,
            None,
            Some("   ".to_string()),
            false,
        );
        assert!(response.ok, "{}", response.message);
        let event = response.event.expect("created event");
        assert_eq!(event.title, title);
        assert_eq!(event.time, "12:00");
        assert_eq!(event.color, "#007AFF");
        assert_eq!(event.location, None);
        assert_eq!(event.date, "2024-03-15T00:00:00.000Z");

        let fetched = calendar_get_event(event.id.clone()).expect("event stored");
        assert_eq!(fetched, event);
        assert!(calendar_list_events()
            .items
            .iter()
            .any(|item| item.id == event.id));
    }

    #[test]
    fn add_event_rejects_blank_title_and_bad_input() {
        let blank = calendar_add_event(
            "   ".to_string(),
            String::new(),
            "2024-03-15".to_string(),
            None,
            None,
            None,
            false,
        );
        assert!(!blank.ok);
        assert!(blank.message.contains("blank"));

        let bad_date = calendar_add_event(
            "x".to_string(),
            String::new(),
            "not a date".to_string(),
            None,
            None,
            None,
            false,
        );
        assert!(!bad_date.ok);

        let bad_color = calendar_add_event(
            "x".to_string(),
            String::new(),
            "2024-03-15".to_string(),
            None,
            Some("#123456".to_string()),
            None,
            false,
        );
        assert!(!bad_color.ok);
    }

    #[test]
    fn update_then_delete_round_trip() {
        let created = calendar_add_event(
            unique_token("ffi-update"),
            "before".to_string(),
            "2024-04-01T09:00:00Z".to_string(),
            Some("09:00".to_string()),
            Some("#ff3b30".to_string()),
            Some("Office".to_string()),
            true,
        );
        let id = created.event.expect("created event").id;

        let updated = calendar_update_event(
            id.clone(),
            None,
            Some("after".to_string()),
            None,
            None,
            None,
            Some(String::new()),
            None,
        );
        assert!(updated.ok, "{}", updated.message);
        let event = updated.event.expect("updated event");
        assert_eq!(event.description, "after");
        assert_eq!(event.color, "#FF3B30");
        assert_eq!(event.location, None);
        assert!(event.reminder);

        assert!(calendar_delete_event(id.clone()).ok);
        assert_eq!(calendar_get_event(id.clone()), None);

        let missing = calendar_update_event(id, None, None, None, None, None, None, Some(false));
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
    }

    #[test]
    fn grid_reports_title_and_markers() {
        let created = calendar_add_event(
            unique_token("ffi-grid"),
            String::new(),
            "1999-02-10T10:00:00Z".to_string(),
            None,
            Some("#34C759".to_string()),
            None,
            false,
        );
        let id = created.event.expect("created event").id;

        let response = calendar_grid("1999-02-10".to_string(), "Month".to_string());
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.title, "February 1999");
        assert_eq!(response.days.len() % 7, 0);
        let day = response
            .days
            .iter()
            .find(|day| day.date == "1999-02-10")
            .expect("day in grid");
        assert!(day.event_count >= 1);
        assert!(day.marker_colors.len() <= 3);

        assert!(calendar_delete_event(id).ok);
        assert!(!calendar_grid("1999-02-10".to_string(), "year".to_string()).ok);
    }

    #[test]
    fn upcoming_is_bounded_and_sorted() {
        let response = calendar_upcoming_events();
        assert!(response.ok, "{}", response.message);
        assert!(response.items.len() <= 5);
        let dates: Vec<&str> = response.items.iter().map(|item| item.date.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
