use chrono::{Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use splitcal_core::calendar::grid::{events_on_day, grid_span};
use splitcal_core::{build_grid, CalendarEvent, EventColor, EventId, GridOptions, ViewMode};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event_at(id: &str, y: i32, m: u32, d: u32, hour: u32) -> CalendarEvent {
    CalendarEvent {
        id: EventId::from(id),
        title: format!("event {id}"),
        description: String::new(),
        date: Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap(),
        time: format!("{hour:02}:00"),
        color: EventColor::Purple,
        location: None,
        reminder: false,
    }
}

#[test]
fn month_grid_is_whole_weeks_for_every_month_and_week_start() {
    let options_for = |week_start| GridOptions {
        week_start,
        ..GridOptions::default()
    };

    for year in [2023, 2024, 2025] {
        for month in 1..=12 {
            for week_start in [Weekday::Sun, Weekday::Mon, Weekday::Sat] {
                let reference = date(year, month, 10);
                let options = options_for(week_start);
                let days = build_grid(reference, ViewMode::Month, &[], reference, &options);

                assert_eq!(days.len() % 7, 0, "{year}-{month} {week_start:?}");
                let first = days.first().unwrap().date;
                let last = days.last().unwrap().date;
                assert_eq!(first.weekday(), week_start);
                assert_eq!(last.weekday(), week_start.pred());
                assert!(first <= date(year, month, 1));
                assert!(first > date(year, month, 1) - Duration::days(7));
                assert!(last.month() != month || last.day() >= 28);
                assert!(days.iter().any(|day| day.date == date(year, month, 1)));
            }
        }
    }
}

#[test]
fn month_grid_flags_neighbouring_month_days() {
    let days = build_grid(
        date(2024, 3, 15),
        ViewMode::Month,
        &[],
        date(2024, 3, 15),
        &GridOptions::default(),
    );

    assert_eq!(days.len(), 42);
    assert_eq!(days[0].date, date(2024, 2, 25));
    assert!(days[0].is_other_month);
    assert!(!days[5].is_other_month);
    assert_eq!(days[5].date, date(2024, 3, 1));
    assert!(days.last().unwrap().is_other_month);
}

#[test]
fn week_grid_is_seven_days_containing_reference() {
    for offset in 0..14 {
        let reference = date(2024, 3, 1) + Duration::days(offset);
        let days = build_grid(
            reference,
            ViewMode::Week,
            &[],
            reference,
            &GridOptions::default(),
        );

        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date.weekday(), Weekday::Sun);
        assert!(days.iter().any(|day| day.date == reference));
        assert!(days.iter().all(|day| !day.is_other_month));
    }
}

#[test]
fn week_span_crosses_month_boundary() {
    let (start, end) = grid_span(date(2024, 3, 1), ViewMode::Week, Weekday::Sun);
    assert_eq!(start, date(2024, 2, 25));
    assert_eq!(end, date(2024, 3, 2));
}

#[test]
fn event_is_bucketed_by_day_regardless_of_time() {
    let events = vec![event_at("1", 2024, 3, 15, 9)];
    let days = build_grid(
        date(2024, 3, 15),
        ViewMode::Month,
        &events,
        date(2024, 1, 1),
        &GridOptions::default(),
    );

    let with_events: Vec<NaiveDate> = days
        .iter()
        .filter(|day| day.event_count > 0)
        .map(|day| day.date)
        .collect();
    assert_eq!(with_events, vec![date(2024, 3, 15)]);
}

#[test]
fn markers_are_capped_with_overflow_count() {
    let events: Vec<CalendarEvent> = (0..5)
        .map(|i| event_at(&i.to_string(), 2024, 3, 15, 8 + i))
        .collect();
    let days = build_grid(
        date(2024, 3, 15),
        ViewMode::Week,
        &events,
        date(2024, 3, 15),
        &GridOptions::default(),
    );

    let friday = days.iter().find(|day| day.date == date(2024, 3, 15)).unwrap();
    assert_eq!(friday.markers.len(), 3);
    assert_eq!(friday.event_count, 5);
    assert_eq!(friday.overflow(), 2);
    assert_eq!(friday.first_event_id(), Some(&EventId::from("0")));
    assert_eq!(friday.markers[0].color, EventColor::Purple);

    assert_eq!(
        events_on_day(&events, date(2024, 3, 15), GridOptions::default().utc_offset).len(),
        5
    );
}

#[test]
fn today_flag_marks_only_the_current_day() {
    let days = build_grid(
        date(2024, 3, 15),
        ViewMode::Month,
        &[],
        date(2024, 3, 20),
        &GridOptions::default(),
    );

    let today: Vec<NaiveDate> = days.iter().filter(|d| d.is_today).map(|d| d.date).collect();
    assert_eq!(today, vec![date(2024, 3, 20)]);
}

#[test]
fn utc_offset_moves_late_events_to_next_day() {
    let events = vec![event_at("late", 2024, 3, 15, 23)];
    let options = GridOptions {
        utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        ..GridOptions::default()
    };
    let days = build_grid(
        date(2024, 3, 15),
        ViewMode::Week,
        &events,
        date(2024, 3, 15),
        &options,
    );

    let busy: Vec<NaiveDate> = days
        .iter()
        .filter(|day| day.event_count > 0)
        .map(|day| day.date)
        .collect();
    assert_eq!(busy, vec![date(2024, 3, 16)]);
}

#[test]
fn grid_is_deterministic() {
    let events = vec![event_at("1", 2024, 3, 3, 9), event_at("2", 2024, 3, 3, 10)];
    let options = GridOptions::default();
    let first = build_grid(date(2024, 3, 1), ViewMode::Month, &events, date(2024, 3, 3), &options);
    let second = build_grid(date(2024, 3, 1), ViewMode::Month, &events, date(2024, 3, 3), &options);
    assert_eq!(first, second);
}
