//! Riddle store adapter: CRUD over a document collection keyed by riddle id.
//!
//! Two backends share the `RiddleStore` trait:
//!   - `FirestoreStore`: the remote collection over the Firestore REST API
//!   - `MemoryStore`: in-process map, used when no project is configured and in tests
//!
//! Deleting a missing id is a successful no-op in both backends.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::{NewRiddle, Riddle, RiddlePatch};
use crate::error::{Result, RiddleError};

pub mod firestore;

pub use firestore::FirestoreStore;

#[async_trait]
pub trait RiddleStore: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    async fn get(&self, id: &str) -> Result<Riddle>;
    async fn list(&self) -> Result<Vec<Riddle>>;
    /// Insert a new record; the store assigns the id.
    async fn create(&self, riddle: NewRiddle) -> Result<String>;
    /// Insert a record under its own id (seeding).
    async fn insert_with_id(&self, riddle: Riddle) -> Result<()>;
    async fn update(&self, id: &str, patch: RiddlePatch) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn is_empty(&self) -> Result<bool>;

    /// Insert every seed, preserving ids, if and only if the collection is empty.
    /// Returns how many records were inserted. Failed inserts are logged and skipped.
    #[instrument(level = "info", skip_all)]
    async fn seed_if_empty(&self, seeds: Vec<Riddle>) -> Result<usize> {
        let backend = self.backend();
        if !self.is_empty().await? {
            info!(target: "riddle", backend, "Collection already contains data, skipping seeding");
            return Ok(0);
        }

        let mut inserted = 0;
        for seed in seeds {
            let id = seed.id.clone();
            let title = seed.title.clone();
            match self.insert_with_id(seed).await {
                Ok(()) => {
                    inserted += 1;
                    info!(target: "riddle", %id, %title, "Seeded riddle");
                }
                Err(e) => error!(target: "riddle", %id, %title, error = %e, "Failed to seed riddle"),
            }
        }
        info!(target: "riddle", backend, inserted, "Seeding complete");
        Ok(inserted)
    }
}

/// In-process store. Iteration order of `list` is unspecified, like the remote one.
#[derive(Default)]
pub struct MemoryStore {
    by_id: RwLock<HashMap<String, Riddle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RiddleStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, id: &str) -> Result<Riddle> {
        self.by_id
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RiddleError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<Riddle>> {
        Ok(self.by_id.read().await.values().cloned().collect())
    }

    async fn create(&self, riddle: NewRiddle) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.by_id
            .write()
            .await
            .insert(id.clone(), riddle.with_id(id.clone()));
        Ok(id)
    }

    async fn insert_with_id(&self, riddle: Riddle) -> Result<()> {
        self.by_id.write().await.insert(riddle.id.clone(), riddle);
        Ok(())
    }

    async fn update(&self, id: &str, patch: RiddlePatch) -> Result<()> {
        let mut by_id = self.by_id.write().await;
        let existing = by_id
            .get_mut(id)
            .ok_or_else(|| RiddleError::NotFound(id.to_string()))?;
        existing.apply(patch);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.by_id.write().await.remove(id);
        Ok(())
    }

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.by_id.read().await.is_empty())
    }
}
