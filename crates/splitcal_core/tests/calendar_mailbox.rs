use chrono::{TimeZone, Utc};
use splitcal_core::storage::KeyValueStore;
use splitcal_core::{
    CalendarConfig, CalendarEvent, CalendarWorker, EventPatch, EventRejection, EventService,
    MailboxError, ManualClock, MemoryKeyValueStore, NewEvent, ViewMode,
};
use std::collections::HashSet;
use std::thread;

fn spawn_worker(storage: MemoryKeyValueStore) -> CalendarWorker {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap());
    let service = EventService::with_clock(storage, CalendarConfig::default(), clock);
    CalendarWorker::spawn(service).unwrap()
}

fn draft(title: &str) -> NewEvent {
    NewEvent::new(title, Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap())
}

#[test]
fn concurrent_adds_are_never_lost() {
    let storage = MemoryKeyValueStore::new();
    let worker = spawn_worker(storage.clone());

    let writers: Vec<_> = (0..8)
        .map(|writer| {
            let handle = worker.handle();
            thread::spawn(move || {
                for i in 0..10 {
                    handle
                        .add_event(draft(&format!("w{writer}-{i}")))
                        .unwrap()
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let events = worker.handle().events().unwrap();
    assert_eq!(events.len(), 80);
    let ids: HashSet<_> = events.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids.len(), 80);

    worker.shutdown();
    let durable: Vec<CalendarEvent> =
        serde_json::from_str(&storage.get("calendar_events").unwrap().unwrap()).unwrap();
    assert_eq!(durable.len(), 80);
}

#[test]
fn handle_exposes_full_lifecycle() {
    let worker = spawn_worker(MemoryKeyValueStore::new());
    let handle = worker.handle();

    let created = handle.add_event(draft("Standup")).unwrap().unwrap();
    let updated = handle
        .update_event(
            created.id.clone(),
            EventPatch {
                reminder: Some(true),
                ..EventPatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert!(updated.reminder);

    let fetched = handle.get_event_by_id(created.id.clone()).unwrap().unwrap();
    assert_eq!(fetched, updated);

    let grid = handle
        .grid(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap().date_naive(), ViewMode::Week)
        .unwrap();
    assert_eq!(grid.iter().map(|day| day.event_count).sum::<usize>(), 1);

    assert_eq!(handle.upcoming().unwrap(), vec![updated]);

    assert!(handle.delete_event(created.id.clone()).unwrap());
    assert_eq!(handle.get_event_by_id(created.id).unwrap(), None);
}

#[test]
fn rejections_pass_through_the_mailbox() {
    let worker = spawn_worker(MemoryKeyValueStore::new());
    let result = worker.handle().add_event(draft("")).unwrap();
    assert_eq!(result, Err(EventRejection::EmptyTitle));
}

#[test]
fn worker_loads_existing_events_before_serving() {
    let storage = MemoryKeyValueStore::new();
    {
        let worker = spawn_worker(storage.clone());
        worker.handle().add_event(draft("persisted")).unwrap().unwrap();
    }

    let worker = spawn_worker(storage);
    let titles: Vec<String> = worker
        .handle()
        .events()
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["persisted".to_string()]);
}

#[test]
fn handle_reports_closed_after_shutdown() {
    let worker = spawn_worker(MemoryKeyValueStore::new());
    let handle = worker.handle();
    worker.shutdown();

    assert!(matches!(handle.events(), Err(MailboxError::Closed)));
}
