use chrono::{TimeZone, Utc};
use splitcal_core::storage::{KeyValueStore, StorageError, StorageResult};
use splitcal_core::{
    CalendarEvent, EventColor, EventId, EventStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const KEY: &str = "calendar_events";

/// Memory store whose reads and writes can be made to fail.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("disk unavailable".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }
}

fn event(id: &str, day: u32) -> CalendarEvent {
    CalendarEvent {
        id: EventId::from(id),
        title: format!("event {id}"),
        description: String::new(),
        date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        time: "09:00".to_string(),
        color: EventColor::Orange,
        location: None,
        reminder: false,
    }
}

#[test]
fn load_from_absent_key_is_empty_and_loaded() {
    let mut store = EventStore::new(MemoryKeyValueStore::new(), KEY);
    assert!(!store.is_loaded());

    store.load();
    assert!(store.is_loaded());
    assert!(store.events().is_empty());
}

#[test]
fn persist_then_reload_round_trips() {
    let storage = MemoryKeyValueStore::new();
    let mut store = EventStore::new(storage.clone(), KEY);
    store.load();

    let events = vec![event("1", 15), event("2", 16)];
    assert!(store.persist(events.clone()));
    assert_eq!(store.events(), events.as_slice());

    let mut restarted = EventStore::new(storage, KEY);
    restarted.load();
    assert_eq!(restarted.events(), events.as_slice());
}

#[test]
fn persist_round_trips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.db");
    let events = vec![event("1", 1), event("2", 31)];

    {
        let mut store = EventStore::new(SqliteKeyValueStore::open(&path).unwrap(), KEY);
        store.load();
        assert!(store.persist(events.clone()));
    }

    let mut reopened = EventStore::new(SqliteKeyValueStore::open(&path).unwrap(), KEY);
    reopened.load();
    assert_eq!(reopened.events(), events.as_slice());
}

#[test]
fn corrupt_value_loads_as_empty() {
    let storage = MemoryKeyValueStore::with_entry(KEY, "{not json");
    let mut store = EventStore::new(storage, KEY);

    store.load();
    assert!(store.is_loaded());
    assert!(store.events().is_empty());
}

#[test]
fn read_failure_loads_as_empty() {
    let storage = FlakyStore::default();
    storage
        .inner
        .set(KEY, &serde_json::to_string(&vec![event("1", 15)]).unwrap())
        .unwrap();
    storage.fail_reads.store(true, Ordering::SeqCst);

    let mut store = EventStore::new(storage, KEY);
    store.load();
    assert!(store.is_loaded());
    assert!(store.events().is_empty());
}

#[test]
fn write_failure_keeps_previous_state() {
    let storage = FlakyStore::default();
    let mut store = EventStore::new(storage.clone(), KEY);
    store.load();
    assert!(store.persist(vec![event("1", 15)]));

    storage.fail_writes.store(true, Ordering::SeqCst);
    assert!(!store.persist(vec![event("1", 15), event("2", 16)]));
    assert_eq!(store.events().len(), 1);

    let stored = storage.inner.get(KEY).unwrap().unwrap();
    let durable: Vec<CalendarEvent> = serde_json::from_str(&stored).unwrap();
    assert_eq!(durable, store.events());
}

#[test]
fn load_drops_duplicate_ids() {
    let raw = serde_json::to_string(&vec![event("7", 15), event("7", 16), event("8", 17)]).unwrap();
    let mut store = EventStore::new(MemoryKeyValueStore::with_entry(KEY, raw), KEY);

    store.load();
    let ids: Vec<&str> = store.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["7", "8"]);
    assert_eq!(store.events()[0].date.format("%d").to_string(), "15");
}

#[test]
fn get_by_id_returns_none_for_unknown_id() {
    let mut store = EventStore::new(MemoryKeyValueStore::new(), KEY);
    store.load();
    store.persist(vec![event("1", 15)]);

    assert_eq!(store.get_by_id(&EventId::from("1")).unwrap().title, "event 1");
    assert!(store.get_by_id(&EventId::from("missing")).is_none());
}

#[test]
fn off_palette_color_does_not_drop_other_records() {
    let raw = r##"[
        {"id":"1","title":"kept","date":"2024-03-15T09:00:00.000Z","time":"09:00","color":"#007AFF"},
        {"id":"2","title":"odd color","date":"2024-03-16T09:00:00.000Z","time":"09:00","color":"#123456"}
    ]"##;
    let storage = MemoryKeyValueStore::with_entry(KEY, raw);
    let mut store = EventStore::new(storage.clone(), KEY);

    store.load();
    let ids: Vec<&str> = store.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(store.events()[1].color, EventColor::Blue);

    let mut next = store.events().to_vec();
    next.push(event("3", 17));
    assert!(store.persist(next));
    let durable: Vec<CalendarEvent> =
        serde_json::from_str(&storage.get(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(durable.len(), 3);
}
