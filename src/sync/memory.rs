//! In-memory store adapters
//!
//! Volatile implementations of both ports. The remote variant can be taken
//! offline to exercise degraded paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entity::{Cached, Entity};
use super::ports::{LocalStore, RemoteStore};
use crate::error::AppError;
use crate::remote::StructuredQuery;

// =============================================================================
// Local
// =============================================================================

/// Local store kept in a map; lost on restart.
///
/// Meant for tests and throwaway sessions. Text queries only see each
/// entity's own fields, so recipes match on title and never on the owner's
/// name; the SQLite store does that join.
pub struct MemoryLocalStore<E> {
    rows: RwLock<BTreeMap<String, Cached<E>>>,
    failing: AtomicBool,
}

impl<E: Entity> MemoryLocalStore<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Simulate a storage-medium fault on every subsequent call.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::LocalStore(format!(
                "{} table is unavailable",
                E::KIND
            )));
        }
        Ok(())
    }
}

impl<E: Entity> Default for MemoryLocalStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> LocalStore<E> for MemoryLocalStore<E> {
    async fn get(&self, id: &str) -> Result<Option<Cached<E>>, AppError> {
        self.check()?;
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn put(&self, record: &Cached<E>) -> Result<(), AppError> {
        self.check()?;
        self.rows
            .write()
            .await
            .insert(record.entity.id().to_string(), record.clone());
        Ok(())
    }

    async fn put_all(&self, records: &[Cached<E>]) -> Result<(), AppError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        for record in records {
            rows.insert(record.entity.id().to_string(), record.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.check()?;
        self.rows.write().await.remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        self.check()?;
        self.rows.write().await.clear();
        Ok(())
    }

    async fn query_by_foreign_key(&self, fk: &str) -> Result<Vec<Cached<E>>, AppError> {
        self.check()?;
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.entity.foreign_key() == Some(fk))
            .cloned()
            .collect())
    }

    async fn query_by_text(&self, needle: &str) -> Result<Vec<Cached<E>>, AppError> {
        self.check()?;
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.entity.matches_text(needle))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Remote
// =============================================================================

/// Remote store kept in a map, with a network switch and a call counter.
pub struct MemoryRemoteStore<E> {
    documents: RwLock<BTreeMap<String, E>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl<E: Entity> MemoryRemoteStore<E> {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_documents(documents: impl IntoIterator<Item = E>) -> Self {
        let documents = documents
            .into_iter()
            .map(|document| (document.id().to_string(), document))
            .collect();
        Self {
            documents: RwLock::new(documents),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// While offline every call fails as a network error would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls attempted so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Seed or replace a document without counting a call.
    pub async fn insert(&self, document: E) {
        self.documents
            .write()
            .await
            .insert(document.id().to_string(), document);
    }

    /// Remove a document without counting a call.
    pub async fn remove(&self, id: &str) {
        self.documents.write().await.remove(id);
    }

    /// Inspect a document without counting a call.
    pub async fn peek(&self, id: &str) -> Option<E> {
        self.documents.read().await.get(id).cloned()
    }

    fn enter(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Remote(format!("{} collection unreachable", E::KIND)));
        }
        Ok(())
    }

    async fn run_query(&self, query: &StructuredQuery) -> Result<Vec<E>, AppError> {
        let documents = self.documents.read().await;
        let mut matches = Vec::new();
        for document in documents.values() {
            if query.matches(&serde_json::to_value(document)?) {
                matches.push(document.clone());
            }
        }
        Ok(matches)
    }
}

impl<E: Entity> Default for MemoryRemoteStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> RemoteStore<E> for MemoryRemoteStore<E> {
    async fn get(&self, id: &str) -> Result<Option<E>, AppError> {
        self.enter()?;
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn put(&self, entity: &E) -> Result<(), AppError> {
        self.enter()?;
        self.insert(entity.clone()).await;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.enter()?;
        self.remove(id).await;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<E>, AppError> {
        self.enter()?;
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn query_by_foreign_key(&self, fk: &str) -> Result<Vec<E>, AppError> {
        self.enter()?;
        let field = E::FOREIGN_KEY_FIELD.ok_or_else(|| {
            AppError::Validation(format!("{} has no foreign key", E::KIND))
        })?;
        self.run_query(&StructuredQuery::equals(field, fk)).await
    }

    async fn query_by_prefix(&self, field: &str, prefix: &str) -> Result<Vec<E>, AppError> {
        self.enter()?;
        self.run_query(&StructuredQuery::starts_with(field, prefix))
            .await
    }
}
