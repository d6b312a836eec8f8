use chrono::{TimeZone, Utc};
use splitcal_core::{CalendarEvent, EventColor, EventId, EventPatch, NewEvent, PALETTE};

fn sample_event() -> CalendarEvent {
    CalendarEvent {
        id: EventId::from("1710493200000"),
        title: "Standup".to_string(),
        description: "daily sync".to_string(),
        date: Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
        time: "09:00".to_string(),
        color: EventColor::Green,
        location: Some("Room 4".to_string()),
        reminder: true,
    }
}

#[test]
fn palette_has_eight_colors_with_blue_default() {
    assert_eq!(PALETTE.len(), 8);
    assert_eq!(PALETTE[0], EventColor::default());
    assert_eq!(EventColor::default().hex(), "#007AFF");
}

#[test]
fn event_serialization_uses_expected_wire_fields() {
    let event = sample_event();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["id"], "1710493200000");
    assert_eq!(json["title"], "Standup");
    assert_eq!(json["description"], "daily sync");
    assert_eq!(json["date"], "2024-03-15T09:00:00.000Z");
    assert_eq!(json["time"], "09:00");
    assert_eq!(json["color"], "#34C759");
    assert_eq!(json["location"], "Room 4");
    assert_eq!(json["reminder"], true);

    let decoded: CalendarEvent = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn absent_location_is_omitted_from_wire_record() {
    let event = CalendarEvent {
        location: None,
        ..sample_event()
    };
    let json = serde_json::to_value(&event).unwrap();
    assert!(json.get("location").is_none());
}

#[test]
fn sparse_record_fills_defaults() {
    let value = serde_json::json!({
        "id": "42",
        "title": "Dentist",
        "date": "2024-03-15",
        "time": "14:30"
    });

    let event: CalendarEvent = serde_json::from_value(value).unwrap();
    assert_eq!(event.description, "");
    assert_eq!(event.color, EventColor::Blue);
    assert_eq!(event.location, None);
    assert!(!event.reminder);
    assert_eq!(event.date, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
}

#[test]
fn unknown_color_decodes_as_default() {
    let value = serde_json::json!({
        "id": "42",
        "title": "Dentist",
        "date": "2024-03-15T10:00:00.000Z",
        "time": "10:00",
        "color": "#ABCDEF"
    });

    let event: CalendarEvent = serde_json::from_value(value).unwrap();
    assert_eq!(event.color, EventColor::Blue);
    assert_eq!(event.title, "Dentist");
}

#[test]
fn into_event_trims_text_and_defaults_color() {
    let mut draft = NewEvent::new("  Standup  ", Utc::now());
    draft.description = "  notes ".to_string();
    draft.location = Some("   ".to_string());

    let event = draft.into_event(EventId::from("1"));
    assert_eq!(event.title, "Standup");
    assert_eq!(event.description, "notes");
    assert_eq!(event.location, None);
    assert_eq!(event.color, EventColor::Blue);
}

#[test]
fn patch_changes_only_named_fields() {
    let event = sample_event();
    let patch = EventPatch {
        time: Some("10:15".to_string()),
        ..EventPatch::default()
    };

    let updated = patch.apply(&event);
    assert_eq!(updated.time, "10:15");
    assert_eq!(
        CalendarEvent {
            time: event.time.clone(),
            ..updated
        },
        event
    );
}

#[test]
fn patch_can_clear_location() {
    let patch = EventPatch {
        location: Some(None),
        ..EventPatch::default()
    };
    assert_eq!(patch.apply(&sample_event()).location, None);
    assert!(EventPatch::default().is_empty());
    assert!(!patch.is_empty());
}
