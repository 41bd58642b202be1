//! Application state: puzzle service over the configured store, daily selector,
//! chat bridge and prompts.
//!
//! Store selection: Firestore when FIRESTORE_PROJECT_ID is set, otherwise an
//! in-memory store. Either way the store is seeded at startup if empty, from the
//! TOML riddle bank when one is configured, else from the built-in seeds.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::{load_riddle_config_from_env, Prompts, RiddleConfig};
use crate::daily::{DailySelector, FileSelectionStorage, SelectionStorage, SystemClock};
use crate::domain::Riddle;
use crate::openai::{ChatBridge, OpenAI};
use crate::puzzle::PuzzleService;
use crate::seeds::seed_riddles;
use crate::store::{FirestoreStore, MemoryStore, RiddleStore};

pub struct AppState {
    pub puzzles: PuzzleService,
    pub daily: DailySelector,
    pub chat: ChatBridge,
}

impl AppState {
    /// Build state from env: load config, pick the store, init the chat bridge, seed.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Self {
        let cfg = load_riddle_config_from_env().unwrap_or_default();

        let store: Arc<dyn RiddleStore> = match FirestoreStore::from_env() {
            Some(fs) => {
                info!(target: "riddle_backend", project = %fs.project_id, collection = %fs.collection, "Using Firestore riddle store.");
                Arc::new(fs)
            }
            None => {
                info!(target: "riddle_backend", "FIRESTORE_PROJECT_ID not set. Using in-memory riddle store.");
                Arc::new(MemoryStore::new())
            }
        };

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "riddle_backend", base_url = %oa.base_url, model = %oa.model, "Chat bridge enabled.");
        } else {
            info!(target: "riddle_backend", "Chat bridge disabled (no OPENAI_API_KEY). Hints and chat will report unavailable.");
        }

        let storage = FileSelectionStorage::from_env();
        info!(target: "riddle_backend", path = %storage.path().display(), "Daily selection storage");

        let RiddleConfig { prompts, riddles } = cfg;
        let state = Self::new(store, openai, prompts, Arc::new(storage));
        state.seed(riddles).await;
        state
    }

    pub fn new(
        store: Arc<dyn RiddleStore>,
        openai: Option<OpenAI>,
        prompts: Prompts,
        storage: Arc<dyn SelectionStorage>,
    ) -> Self {
        let puzzles = PuzzleService::new(store);
        let daily = DailySelector::new(puzzles.clone(), storage, Arc::new(SystemClock));
        let chat = ChatBridge::new(openai, prompts);
        Self { puzzles, daily, chat }
    }

    /// Seed an empty store. Failures are logged; the service keeps running.
    #[instrument(level = "info", skip(self, bank), fields(bank = bank.len()))]
    pub async fn seed(&self, bank: Vec<Riddle>) {
        let seeds = if bank.is_empty() { seed_riddles() } else { bank };
        match self.puzzles.initialize(seeds).await {
            Ok(n) => info!(target: "riddle", inserted = n, backend = self.puzzles.backend(), "Startup seeding finished"),
            Err(e) => error!(target: "riddle", error = %e, "Startup seeding failed; continuing without seed data"),
        }
    }
}
