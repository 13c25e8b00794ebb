//! The state controller: sole owner and writer of [`HydrationState`].
//!
//! Mutations apply synchronously and are visible to the next read right away.
//! Persisting them is handed to a background task and never awaited by the
//! mutator; storage failures end up in the logs only.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, instrument};

use crate::{
    aggregate::{self, MonthlyStats, Progress},
    clock::{format_date, Clock, DateBasis, SystemClock},
    config::TrackerConfig,
    storage::{load_state, FileStore, KeyValueStore},
    structs::{
        daily_total::DailyTotal, hydration_entry::HydrationEntry,
        hydration_state::HydrationState, language::Language,
    },
    tasks::persistence::{save_worker, SaveQueue},
};

/// What changed, as reported to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    EntryAdded(HydrationEntry),
    DailyGoalChanged(u32),
    LanguageChanged(Language),
    /// State was replaced by the saved payload
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StateChange) + Send + Sync>;

pub(crate) struct Shared {
    state: RwLock<HydrationState>,
    pub(crate) storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    basis: DateBasis,
    pub(crate) saves: SaveQueue,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, HydrationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HydrationState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> HydrationState {
        self.read().clone()
    }
}

/// Stops the save worker once the last store handle is gone
struct WorkerGuard(Arc<Shared>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.0.saves.stop();
    }
}

/// Handle to the hydration state. Clones share the same state.
///
/// Must be created inside a tokio runtime, which runs the save worker.
#[derive(Clone)]
pub struct HydrationStore {
    shared: Arc<Shared>,
    _worker: Arc<WorkerGuard>,
}

impl HydrationStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock), DateBasis::default())
    }

    pub fn with_clock(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        basis: DateBasis,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: RwLock::new(HydrationState::default()),
            storage,
            clock,
            basis,
            saves: SaveQueue::default(),
            listeners: Mutex::new(vec![]),
            next_subscription: AtomicU64::new(0),
        });

        tokio::task::spawn(save_worker(shared.clone()));

        Self {
            _worker: Arc::new(WorkerGuard(shared.clone())),
            shared,
        }
    }

    /// File-backed store in the configured data directory
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::with_clock(
            Arc::new(FileStore::new(&config.data_dir)),
            Arc::new(SystemClock),
            config.date_basis,
        )
    }

    // Actions

    /// Appends an entry stamped with the current instant. No range checks here.
    pub fn add_entry(&self, amount: u32) -> HydrationEntry {
        self.add_entry_at(amount, self.shared.clock.now())
    }

    /// Appends an entry stamped with `at`, e.g. an imported or forgotten drink
    pub fn add_entry_at(&self, amount: u32, at: DateTime<Utc>) -> HydrationEntry {
        let entry = HydrationEntry::new(amount, at, self.shared.basis);
        debug!(amount, date = %entry.date, "Adding hydration entry");

        self.shared.write().entries.push(entry.clone());

        self.changed(StateChange::EntryAdded(entry.clone()));
        entry
    }

    pub fn set_daily_goal(&self, goal: u32) {
        debug!(goal, "Setting daily goal");
        self.shared.write().daily_goal = goal;
        self.changed(StateChange::DailyGoalChanged(goal));
    }

    pub fn set_language(&self, language: Language) {
        debug!(%language, "Setting language");
        self.shared.write().language = language;
        self.changed(StateChange::LanguageChanged(language));
    }

    // Queries

    pub fn entries(&self) -> Vec<HydrationEntry> {
        self.shared.read().entries.clone()
    }

    pub fn daily_goal(&self) -> u32 {
        self.shared.read().daily_goal
    }

    pub fn language(&self) -> Language {
        self.shared.read().language
    }

    pub fn snapshot(&self) -> HydrationState {
        self.shared.snapshot()
    }

    /// Calendar date of the current instant, derived the same way as entry dates
    pub fn today(&self) -> NaiveDate {
        self.shared.basis.calendar_date(self.shared.clock.now())
    }

    pub fn today_total(&self) -> u64 {
        self.date_total(&format_date(self.today()))
    }

    pub fn date_total(&self, date: &str) -> u64 {
        aggregate::date_total(&self.shared.read().entries, date)
    }

    pub fn monthly_data(&self) -> Vec<DailyTotal> {
        let today = self.today();
        aggregate::monthly_data(&self.shared.read().entries, today)
    }

    pub fn monthly_stats(&self) -> MonthlyStats {
        MonthlyStats::from_window(&self.monthly_data(), self.daily_goal())
    }

    pub fn today_progress(&self) -> Progress {
        let today = format_date(self.today());
        let state = self.shared.read();
        Progress::new(
            aggregate::date_total(&state.entries, &today),
            state.daily_goal,
        )
    }

    // Persistence

    /// Replaces the in-memory state with the saved one, if there is one.
    /// Read and parse failures are logged and leave the state untouched.
    #[instrument(skip(self))]
    pub async fn load_data(&self) {
        match load_state(self.shared.storage.as_ref()).await {
            Ok(Some(state)) => {
                info!(
                    entries = state.entries.len(),
                    daily_goal = state.daily_goal,
                    language = %state.language,
                    "Loaded hydration data"
                );
                *self.shared.write() = state;
                self.notify(&StateChange::Loaded);
            }
            Ok(None) => debug!("No saved hydration data, keeping defaults"),
            Err(error) => error!(%error, "Failed to load hydration data"),
        }
    }

    /// Saves the current state and waits for the write. Goes through the save
    /// worker like every other save, so it never races a newer snapshot.
    /// Failures are logged, not returned.
    #[instrument(skip(self))]
    pub async fn save_data(&self) {
        let generation = self.shared.saves.request();
        self.shared.saves.wait_for(generation).await;
    }

    /// Waits until every save requested so far has been attempted
    pub async fn flush(&self) {
        let generation = self.shared.saves.requested();
        self.shared.saves.wait_for(generation).await;
    }

    /// Flushes pending saves, then stops the save worker.
    ///
    /// Other handles keep working in memory, but nothing they change after
    /// this is written.
    pub async fn shutdown(self) {
        self.flush().await;
        self.shared.saves.stop();
        self.shared.saves.wait_stopped().await;
    }

    // Subscriptions

    pub fn subscribe(
        &self,
        listener: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.shared.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn changed(&self, change: StateChange) {
        self.notify(&change);
        self.shared.saves.request();
    }

    fn notify(&self, change: &StateChange) {
        // Listeners may call back into the store, so no lock is held while they run
        let listeners: Vec<Listener> = self
            .shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(change);
        }
    }
}
