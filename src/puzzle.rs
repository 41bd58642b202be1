//! Puzzle service: the UI-facing façade over a `RiddleStore`.
//!
//! Adds no business rules beyond error normalization: store transport failures
//! surface as `RiddleError::Service`, while `NotFound` passes through unchanged.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

use crate::domain::{NewRiddle, Riddle, RiddlePatch};
use crate::error::{Result, RiddleError};
use crate::store::RiddleStore;

#[derive(Clone)]
pub struct PuzzleService {
    store: Arc<dyn RiddleStore>,
}

fn normalize(e: RiddleError) -> RiddleError {
    match e {
        RiddleError::StoreUnavailable(msg) => RiddleError::Service(msg),
        other => other,
    }
}

impl PuzzleService {
    pub fn new(store: Arc<dyn RiddleStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Seed the store if, and only if, it is empty.
    #[instrument(level = "info", skip(self, seeds), fields(backend = self.store.backend()))]
    pub async fn initialize(&self, seeds: Vec<Riddle>) -> Result<usize> {
        self.store.seed_if_empty(seeds).await.map_err(normalize)
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_riddle(&self, id: &str) -> Result<Riddle> {
        self.store.get(id).await.map_err(normalize)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_all_riddles(&self) -> Result<Vec<Riddle>> {
        let riddles = self.store.list().await.map_err(normalize)?;
        debug!(target: "riddle", count = riddles.len(), "Fetched all riddles");
        Ok(riddles)
    }

    /// Lists everything then picks uniformly. Fine for small collections only.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_random_riddle(&self) -> Result<Option<Riddle>> {
        let riddles = self.get_all_riddles().await?;
        Ok(riddles.choose(&mut rand::thread_rng()).cloned())
    }

    #[instrument(level = "info", skip(self, riddle), fields(title = %riddle.title))]
    pub async fn add_riddle(&self, riddle: NewRiddle) -> Result<String> {
        let id = self.store.create(riddle).await.map_err(normalize)?;
        info!(target: "riddle", %id, "Riddle added");
        Ok(id)
    }

    #[instrument(level = "info", skip(self, patch), fields(%id))]
    pub async fn update_riddle(&self, id: &str, patch: RiddlePatch) -> Result<()> {
        self.store.update(id, patch).await.map_err(normalize)
    }

    /// Deleting an id that does not exist succeeds.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn delete_riddle(&self, id: &str) -> Result<()> {
        self.store.delete(id).await.map_err(normalize)
    }
}
