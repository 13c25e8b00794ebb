use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use chrono::{Duration, TimeZone, Utc};
use hydrate_tracker::{
    clock::{Clock, DateBasis, ManualClock},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageResult, STORAGE_KEY},
    HydrationState, HydrationStore, Language, StateChange,
};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 9, 20, 10, 30, 0).unwrap(),
    ))
}

fn memory_store(storage: &Arc<MemoryStore>) -> HydrationStore {
    HydrationStore::with_clock(storage.clone(), clock(), DateBasis::Utc)
}

#[tokio::test]
async fn save_then_load_restores_everything() {
    let storage = Arc::new(MemoryStore::new());

    let first = memory_store(&storage);
    first.add_entry(250);
    first.add_entry(500);
    first.set_daily_goal(3000);
    first.set_language(Language::Hi);
    first.save_data().await;
    let saved = first.snapshot();
    first.shutdown().await;

    let second = memory_store(&storage);
    assert_eq!(second.snapshot(), HydrationState::default());

    second.load_data().await;
    assert_eq!(second.snapshot(), saved);
    assert_eq!(second.today_total(), 750);
}

#[tokio::test]
async fn goal_survives_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let store = HydrationStore::with_clock(
        Arc::new(FileStore::new(dir.path())),
        clock(),
        DateBasis::Utc,
    );
    store.set_daily_goal(3000);
    store.shutdown().await;

    let restarted = HydrationStore::with_clock(
        Arc::new(FileStore::new(dir.path())),
        clock(),
        DateBasis::Utc,
    );
    restarted.load_data().await;
    assert_eq!(restarted.daily_goal(), 3000);
}

#[tokio::test]
async fn partial_payloads_are_filled_with_defaults() {
    let storage = Arc::new(MemoryStore::new());
    storage.insert_raw(STORAGE_KEY, r#"{"language":"hi"}"#);

    let store = memory_store(&storage);
    store.load_data().await;

    assert_eq!(store.daily_goal(), 2000);
    assert_eq!(store.language(), Language::Hi);
    assert!(store.entries().is_empty());

    storage.insert_raw(STORAGE_KEY, r#"{"dailyGoal":1500}"#);
    store.load_data().await;
    assert_eq!(store.daily_goal(), 1500);
    assert_eq!(store.language(), Language::En);
}

#[tokio::test]
async fn load_replaces_state_wholesale() {
    let storage = Arc::new(MemoryStore::new());
    let store = memory_store(&storage);
    store.add_entry(900);
    store.set_daily_goal(4000);
    store.flush().await;

    storage.insert_raw(STORAGE_KEY, r#"{"entries":[]}"#);
    store.load_data().await;

    assert!(store.entries().is_empty());
    assert_eq!(store.daily_goal(), 2000);
}

#[tokio::test]
async fn corrupt_payload_leaves_state_untouched() {
    let storage = Arc::new(MemoryStore::new());
    let store = memory_store(&storage);
    store.add_entry(250);
    store.set_daily_goal(2500);
    store.flush().await;
    let before = store.snapshot();

    storage.insert_raw(STORAGE_KEY, "{\"entries\": [oops");
    store.load_data().await;
    assert_eq!(store.snapshot(), before);

    storage.insert_raw(STORAGE_KEY, r#"{"language":"fr"}"#);
    store.load_data().await;
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn read_failure_leaves_state_untouched() {
    let storage = Arc::new(MemoryStore::new());
    let store = memory_store(&storage);
    store.set_language(Language::Hi);
    store.flush().await;

    storage.set_failing(true);
    store.load_data().await;

    assert_eq!(store.language(), Language::Hi);
}

#[tokio::test]
async fn write_failure_only_costs_durability() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_failing(true);

    let store = memory_store(&storage);
    store.add_entry(250);
    store.flush().await;
    store.save_data().await;

    // The running process still sees the entry
    assert_eq!(store.today_total(), 250);
    storage.set_failing(false);
    assert!(storage.raw(STORAGE_KEY).is_none());

    // The next mutation persists the whole state, including the earlier entry
    store.add_entry(100);
    store.flush().await;
    let saved: HydrationState = serde_json::from_str(&storage.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved.entries.len(), 2);
}

#[tokio::test]
async fn burst_of_mutations_ends_with_latest_state_saved() {
    let storage = Arc::new(MemoryStore::new());
    let store = memory_store(&storage);

    for amount in 1..=200 {
        store.add_entry(amount);
    }
    store.set_daily_goal(3500);
    store.flush().await;

    let saved: HydrationState = serde_json::from_str(&storage.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved.entries.len(), 200);
    assert_eq!(saved.daily_goal, 3500);
    assert_eq!(saved, store.snapshot());
}

/// Counts writes so coalescing can be observed
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: Mutex<usize>,
}

#[async_trait::async_trait]
impl KeyValueStore for CountingStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        *self.writes.lock().unwrap() += 1;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.inner.set_item(key, value).await
    }
}

#[tokio::test]
async fn saves_are_coalesced() {
    let storage = Arc::new(CountingStore::default());
    let store = HydrationStore::with_clock(storage.clone(), clock(), DateBasis::Utc);

    for _ in 0..50 {
        store.add_entry(100);
    }
    store.flush().await;

    let writes = *storage.writes.lock().unwrap();
    assert!(writes >= 1);
    assert!(writes < 50, "expected coalesced writes, got {writes}");
}

/// Holds up the first write so a later save gets the chance to overtake it
#[derive(Default)]
struct SlowFirstWrite {
    inner: MemoryStore,
    delayed: AtomicBool,
}

#[async_trait::async_trait]
impl KeyValueStore for SlowFirstWrite {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        if !self.delayed.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        self.inner.set_item(key, value).await
    }
}

#[tokio::test]
async fn explicit_save_never_overwrites_newer_state() {
    let storage = Arc::new(SlowFirstWrite::default());
    let store = HydrationStore::with_clock(storage.clone(), clock(), DateBasis::Utc);
    let writer = store.clone();

    tokio::join!(writer.save_data(), async {
        store.add_entry(250);
        store.flush().await;
    });

    let saved: HydrationState =
        serde_json::from_str(&storage.inner.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved.entries.len(), 1);
    assert_eq!(saved, store.snapshot());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn saved_state_never_falls_behind_concurrent_writers() {
    let storage = Arc::new(CountingStore::default());
    let store = HydrationStore::with_clock(storage.clone(), clock(), DateBasis::Utc);

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let handle = store.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    handle.add_entry(10);
                    if i % 2 == 0 {
                        handle.save_data().await;
                    }
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }
    store.flush().await;

    let saved: HydrationState =
        serde_json::from_str(&storage.inner.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved.entries.len(), 80);
    assert_eq!(saved, store.snapshot());
}

#[tokio::test]
async fn payload_uses_the_documented_layout() {
    let storage = Arc::new(MemoryStore::new());
    let clock = clock();
    let store = HydrationStore::with_clock(storage.clone(), clock.clone(), DateBasis::Utc);

    let entry = store.add_entry(250);
    store.flush().await;

    let raw: serde_json::Value = serde_json::from_str(&storage.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "entries": [{
                "id": entry.id,
                "amount": 250,
                "timestamp": clock.now().timestamp_millis(),
                "date": "2024-09-20",
            }],
            "dailyGoal": 2000,
            "language": "en",
        })
    );
}

#[tokio::test]
async fn subscribers_hear_about_loads() {
    let storage = Arc::new(MemoryStore::new());
    storage.insert_raw(STORAGE_KEY, r#"{"dailyGoal":2200}"#);
    let store = memory_store(&storage);

    let seen = Arc::new(Mutex::new(vec![]));
    let sink = seen.clone();
    store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

    store.load_data().await;
    store.add_entry(10);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], StateChange::Loaded);
    assert!(matches!(seen[1], StateChange::EntryAdded(ref e) if e.amount == 10));
}

#[tokio::test]
async fn clock_advance_is_reflected_in_new_entries() {
    let storage = Arc::new(MemoryStore::new());
    let clock = clock();
    let store = HydrationStore::with_clock(storage, clock.clone(), DateBasis::Utc);

    store.add_entry(100);
    clock.advance(Duration::days(1));
    store.add_entry(200);

    let dates: Vec<String> = store.entries().into_iter().map(|e| e.date).collect();
    assert_eq!(dates, ["2024-09-20", "2024-09-21"]);
}
