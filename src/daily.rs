//! "Riddle of the Day": a once-per-calendar-day memoized random pick.
//!
//! The chosen id is persisted under a single key as `{date, riddleId}`.
//! Activation rules:
//!   - stored date == today  -> serve the stored riddle (fresh pick if it was deleted upstream)
//!   - absent or stale       -> list, pick uniformly, persist, serve
//!   - empty collection      -> `None`, nothing persisted
//!
//! Storage failures are best-effort: logged and treated as "nothing stored".
//! Different processes may well pick different riddles for the same day.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use crate::domain::{DailySelection, Riddle};
use crate::error::{Result, RiddleError};
use crate::puzzle::PuzzleService;

// =============================================================================
// Clock
// =============================================================================

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date from the system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub std::sync::Mutex<NaiveDate>);

#[cfg(test)]
impl FixedClock {
    pub fn at(date: NaiveDate) -> Self {
        Self(std::sync::Mutex::new(date))
    }

    pub fn set(&self, date: NaiveDate) {
        *self.0.lock().unwrap() = date;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =============================================================================
// Selection storage (single key)
// =============================================================================

#[async_trait]
pub trait SelectionStorage: Send + Sync {
    async fn load(&self) -> std::io::Result<Option<DailySelection>>;
    async fn save(&self, selection: &DailySelection) -> std::io::Result<()>;
}

/// JSON file holding the one selection record.
pub struct FileSelectionStorage {
    path: PathBuf,
}

impl FileSelectionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// DAILY_SELECTION_PATH or `./data/riddle_of_the_day.json`.
    pub fn from_env() -> Self {
        let path = std::env::var("DAILY_SELECTION_PATH")
            .unwrap_or_else(|_| "./data/riddle_of_the_day.json".into());
        Self::new(path)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SelectionStorage for FileSelectionStorage {
    async fn load(&self) -> std::io::Result<Option<DailySelection>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    async fn save(&self, selection: &DailySelection) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string(selection)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&self.path, raw).await
    }
}

#[derive(Default)]
pub struct MemorySelectionStorage {
    slot: RwLock<Option<DailySelection>>,
}

#[async_trait]
impl SelectionStorage for MemorySelectionStorage {
    async fn load(&self) -> std::io::Result<Option<DailySelection>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, selection: &DailySelection) -> std::io::Result<()> {
        *self.slot.write().await = Some(selection.clone());
        Ok(())
    }
}

// =============================================================================
// Selector
// =============================================================================

pub struct DailySelector {
    puzzles: PuzzleService,
    storage: Arc<dyn SelectionStorage>,
    clock: Arc<dyn Clock>,
    // Guards storage read-check-write only; never held across store calls.
    gate: Mutex<()>,
}

impl DailySelector {
    pub fn new(puzzles: PuzzleService, storage: Arc<dyn SelectionStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { puzzles, storage, clock, gate: Mutex::new(()) }
    }

    /// Today's riddle, or `None` when the collection is empty.
    #[instrument(level = "info", skip(self))]
    pub async fn riddle_of_the_day(&self) -> Result<Option<Riddle>> {
        let today = day_key(self.clock.today());

        let stored = {
            let _guard = self.gate.lock().await;
            self.load_for(&today).await
        };

        if let Some(sel) = stored {
            match self.puzzles.get_riddle(&sel.riddle_id).await {
                Ok(r) => {
                    info!(target: "riddle", %today, id = %r.id, source = "stored", "Riddle of the day served");
                    return Ok(Some(r));
                }
                Err(RiddleError::NotFound(id)) => {
                    warn!(target: "riddle", %today, %id, "Stored riddle of the day no longer exists; picking fresh");
                }
                Err(e) => return Err(e),
            }
        }

        self.select_fresh(today).await
    }

    /// Stored selection for `day`, if any. Read failures count as nothing stored.
    async fn load_for(&self, day: &str) -> Option<DailySelection> {
        match self.storage.load().await {
            Ok(s) => s.filter(|s| s.date == day),
            Err(e) => {
                warn!(target: "riddle", error = %e, "Could not read daily selection; picking fresh");
                None
            }
        }
    }

    async fn select_fresh(&self, today: String) -> Result<Option<Riddle>> {
        let riddles = self.puzzles.get_all_riddles().await?;

        let _guard = self.gate.lock().await;
        // A concurrent activation may have picked while we were listing.
        if let Some(sel) = self.load_for(&today).await {
            if let Some(r) = riddles.iter().find(|r| r.id == sel.riddle_id) {
                info!(target: "riddle", %today, id = %r.id, source = "concurrent", "Riddle of the day served");
                return Ok(Some(r.clone()));
            }
        }

        let picked = match riddles.choose(&mut rand::thread_rng()) {
            Some(r) => r.clone(),
            None => {
                info!(target: "riddle", %today, "No riddles available for the day");
                return Ok(None);
            }
        };

        let selection = DailySelection { date: today.clone(), riddle_id: picked.id.clone() };
        if let Err(e) = self.storage.save(&selection).await {
            warn!(target: "riddle", error = %e, "Could not persist daily selection");
        }
        info!(target: "riddle", %today, id = %picked.id, source = "fresh_pick", "Riddle of the day served");
        Ok(Some(picked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewRiddle, RiddlePatch};
    use crate::seeds::seed_riddles;
    use crate::store::{MemoryStore, RiddleStore};
    use tokio::sync::Notify;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup(
        seed: bool,
        clock: Arc<FixedClock>,
    ) -> (DailySelector, Arc<MemorySelectionStorage>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        if seed {
            store.seed_if_empty(seed_riddles()).await.unwrap();
        }
        let storage = Arc::new(MemorySelectionStorage::default());
        let selector = DailySelector::new(PuzzleService::new(store.clone()), storage.clone(), clock);
        (selector, storage, store)
    }

    #[tokio::test]
    async fn same_day_activations_return_the_stored_riddle() {
        let clock = Arc::new(FixedClock::at(day(2024, 5, 1)));
        let (selector, storage, _) = setup(true, clock).await;
        storage
            .save(&DailySelection { date: "2024-05-01".into(), riddle_id: "3".into() })
            .await
            .unwrap();

        for _ in 0..5 {
            let r = selector.riddle_of_the_day().await.unwrap().unwrap();
            assert_eq!(r.id, "3");
        }
    }

    #[tokio::test]
    async fn first_pick_is_memoized_for_the_day() {
        let clock = Arc::new(FixedClock::at(day(2024, 5, 1)));
        let (selector, _, _) = setup(true, clock).await;
        let first = selector.riddle_of_the_day().await.unwrap().unwrap();
        for _ in 0..5 {
            assert_eq!(selector.riddle_of_the_day().await.unwrap().unwrap().id, first.id);
        }
    }

    #[tokio::test]
    async fn stale_selection_is_replaced_with_today() {
        let clock = Arc::new(FixedClock::at(day(2024, 5, 2)));
        let (selector, storage, _) = setup(true, clock.clone()).await;
        storage
            .save(&DailySelection { date: "2024-05-01".into(), riddle_id: "3".into() })
            .await
            .unwrap();

        let r = selector.riddle_of_the_day().await.unwrap().unwrap();
        let sel = storage.load().await.unwrap().unwrap();
        assert_eq!(sel.date, "2024-05-02");
        assert_eq!(sel.riddle_id, r.id);

        clock.set(day(2024, 5, 3));
        selector.riddle_of_the_day().await.unwrap();
        assert_eq!(storage.load().await.unwrap().unwrap().date, "2024-05-03");
    }

    #[tokio::test]
    async fn deleted_selection_falls_back_to_a_fresh_pick() {
        let clock = Arc::new(FixedClock::at(day(2024, 5, 1)));
        let (selector, storage, store) = setup(true, clock).await;
        storage
            .save(&DailySelection { date: "2024-05-01".into(), riddle_id: "3".into() })
            .await
            .unwrap();
        store.delete("3").await.unwrap();

        let r = selector.riddle_of_the_day().await.unwrap().unwrap();
        assert_ne!(r.id, "3");
        assert_eq!(storage.load().await.unwrap().unwrap().riddle_id, r.id);
    }

    #[tokio::test]
    async fn empty_collection_yields_none_and_stores_nothing() {
        let clock = Arc::new(FixedClock::at(day(2024, 5, 1)));
        let (selector, storage, _) = setup(false, clock).await;
        assert!(selector.riddle_of_the_day().await.unwrap().is_none());
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_storage_round_trips_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSelectionStorage::new(dir.path().join("nested").join("daily.json"));
        assert!(storage.load().await.unwrap().is_none());

        let sel = DailySelection { date: "2024-05-01".into(), riddle_id: "7".into() };
        storage.save(&sel).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(sel));

        let raw = std::fs::read_to_string(storage.path()).unwrap();
        assert!(raw.contains("\"riddleId\":\"7\""));
    }

    #[tokio::test]
    async fn corrupt_storage_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.json");
        std::fs::write(&path, "not json").unwrap();

        let store = Arc::new(MemoryStore::new());
        store.seed_if_empty(seed_riddles()).await.unwrap();
        let selector = DailySelector::new(
            PuzzleService::new(store),
            Arc::new(FileSelectionStorage::new(&path)),
            Arc::new(FixedClock::at(day(2024, 5, 1))),
        );

        let r = selector.riddle_of_the_day().await.unwrap().unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(&r.id));
    }

    /// Memory store whose `list` parks until released.
    struct ParkedListStore {
        inner: MemoryStore,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RiddleStore for ParkedListStore {
        fn backend(&self) -> &'static str {
            "parked"
        }
        async fn get(&self, id: &str) -> Result<Riddle> {
            self.inner.get(id).await
        }
        async fn list(&self) -> Result<Vec<Riddle>> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.list().await
        }
        async fn create(&self, riddle: NewRiddle) -> Result<String> {
            self.inner.create(riddle).await
        }
        async fn insert_with_id(&self, riddle: Riddle) -> Result<()> {
            self.inner.insert_with_id(riddle).await
        }
        async fn update(&self, id: &str, patch: RiddlePatch) -> Result<()> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &str) -> Result<()> {
            self.inner.delete(id).await
        }
        async fn is_empty(&self) -> Result<bool> {
            self.inner.is_empty().await
        }
    }

    #[tokio::test]
    async fn gate_is_free_while_listing_and_concurrent_pick_wins() {
        let inner = MemoryStore::new();
        inner.seed_if_empty(seed_riddles()).await.unwrap();
        let store = Arc::new(ParkedListStore { inner, entered: Notify::new(), release: Notify::new() });
        let storage = Arc::new(MemorySelectionStorage::default());
        let selector = Arc::new(DailySelector::new(
            PuzzleService::new(store.clone()),
            storage.clone(),
            Arc::new(FixedClock::at(day(2024, 5, 1))),
        ));

        let pending = tokio::spawn({
            let selector = selector.clone();
            async move { selector.riddle_of_the_day().await }
        });
        store.entered.notified().await;

        // The store call is in flight; storage access must not be blocked.
        assert!(selector.gate.try_lock().is_ok());
        storage
            .save(&DailySelection { date: "2024-05-01".into(), riddle_id: "3".into() })
            .await
            .unwrap();

        store.release.notify_one();
        let r = pending.await.unwrap().unwrap().unwrap();
        assert_eq!(r.id, "3");
        assert_eq!(storage.load().await.unwrap().unwrap().riddle_id, "3");
    }
}
