//! Cache-aside synchronization engine
//!
//! Mediates between a durable local cache and the authoritative remote
//! store for one entity type. Every operation is a short, self-contained
//! decision procedure with at most one remote round trip:
//!
//! - reads trust a fresh local copy, otherwise ask remote and fall back to
//!   whatever is cached when remote fails
//! - writes and deletes apply both legs independently; a failed remote leg
//!   is reported, never rolled back
//!
//! Local-store faults are the only errors that escape, apart from
//! [`SyncEngine::bulk_ingest`] which fails loudly on remote errors.

use std::sync::Arc;

use super::entity::{Cached, Entity};
use super::freshness::{Clock, FreshnessPolicy};
use super::outcome::{Fetched, Origin, Outcome};
use super::ports::{LocalStore, RemoteStore};
use crate::error::AppError;
use crate::metrics::{self, CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, DEGRADED_READS_TOTAL};

/// Synchronization engine for one entity type.
///
/// Holds no state besides its collaborators; cheap to clone and safe to
/// call from many tasks at once. Concurrent writes to the same id are not
/// serialized: whichever leg completes last wins.
pub struct SyncEngine<E: Entity> {
    local: Arc<dyn LocalStore<E>>,
    remote: Arc<dyn RemoteStore<E>>,
    clock: Arc<dyn Clock>,
    policy: FreshnessPolicy,
}

impl<E: Entity> Clone for SyncEngine<E> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: Arc::clone(&self.remote),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<E: Entity> SyncEngine<E> {
    pub fn new(
        local: Arc<dyn LocalStore<E>>,
        remote: Arc<dyn RemoteStore<E>>,
        clock: Arc<dyn Clock>,
        policy: FreshnessPolicy,
    ) -> Self {
        Self {
            local,
            remote,
            clock,
            policy,
        }
    }

    /// Current time according to the engine's clock.
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    fn stamp(&self, entity: E) -> Cached<E> {
        Cached::new(entity, self.clock.now_millis())
    }

    fn remote_failed(&self, operation: &str, error: &AppError) {
        metrics::remote_failure(E::KIND, operation);
        tracing::warn!(
            entity = E::KIND,
            operation,
            %error,
            "Remote store call failed"
        );
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read-through lookup by id.
    ///
    /// Returns `Ok(None)` only when neither store can produce the entity.
    pub async fn read_by_id(&self, id: &str) -> Result<Option<Fetched<E>>, AppError> {
        let local = self.local.get(id).await?;

        if let Some(cached) = &local {
            if self.policy.is_fresh(cached.cached_at, self.clock.now_millis()) {
                CACHE_HITS_TOTAL.with_label_values(&[E::KIND]).inc();
                tracing::debug!(entity = E::KIND, id, "Cache hit");
                return Ok(Some(Fetched::new(cached.entity.clone(), Origin::LocalFresh)));
            }
        }

        CACHE_MISSES_TOTAL.with_label_values(&[E::KIND]).inc();
        tracing::debug!(
            entity = E::KIND,
            id,
            cached = local.is_some(),
            "Cache miss or stale, asking remote"
        );

        match self.remote.get(id).await {
            Ok(Some(entity)) => {
                let record = self.stamp(entity);
                self.local.put(&record).await?;
                Ok(Some(Fetched::new(record.entity, Origin::Remote)))
            }
            // a remote miss never destroys the cached copy
            Ok(None) => Ok(local.map(|cached| Fetched::new(cached.entity, Origin::LocalStale))),
            Err(error) => {
                self.remote_failed("get", &error);
                if local.is_some() {
                    DEGRADED_READS_TOTAL.with_label_values(&[E::KIND]).inc();
                }
                Ok(local.map(|cached| Fetched::new(cached.entity, Origin::Degraded)))
            }
        }
    }

    /// Cache-aside list of every entity sharing a foreign key.
    ///
    /// A non-empty local set where every row is fresh is served as is.
    /// Otherwise remote wins and its rows are upserted; local rows remote did
    /// not return are kept. Remote failure yields the local set, never an
    /// error.
    pub async fn list_by_foreign_key(&self, fk: &str) -> Result<Fetched<Vec<E>>, AppError> {
        let local = self.local.query_by_foreign_key(fk).await?;
        let now = self.clock.now_millis();

        if !local.is_empty() && local.iter().all(|row| self.policy.is_fresh(row.cached_at, now)) {
            CACHE_HITS_TOTAL.with_label_values(&[E::KIND]).inc();
            return Ok(Fetched::new(
                local.into_iter().map(Cached::into_entity).collect(),
                Origin::LocalFresh,
            ));
        }

        CACHE_MISSES_TOTAL.with_label_values(&[E::KIND]).inc();
        match self.remote.query_by_foreign_key(fk).await {
            Ok(entities) => {
                self.cache_all(&entities).await?;
                Ok(Fetched::new(entities, Origin::Remote))
            }
            Err(error) => {
                self.remote_failed("query_by_foreign_key", &error);
                DEGRADED_READS_TOTAL.with_label_values(&[E::KIND]).inc();
                Ok(Fetched::new(
                    local.into_iter().map(Cached::into_entity).collect(),
                    Origin::Degraded,
                ))
            }
        }
    }

    /// Remote "starts with" search on `field`, cached locally.
    ///
    /// Falls back to the local case-insensitive text search when remote is
    /// unreachable.
    pub async fn search_by_prefix(
        &self,
        field: &str,
        prefix: &str,
    ) -> Result<Fetched<Vec<E>>, AppError> {
        match self.remote.query_by_prefix(field, prefix).await {
            Ok(entities) => {
                self.cache_all(&entities).await?;
                Ok(Fetched::new(entities, Origin::Remote))
            }
            Err(error) => {
                self.remote_failed("query_by_prefix", &error);
                DEGRADED_READS_TOTAL.with_label_values(&[E::KIND]).inc();
                let local = self.local.query_by_text(prefix).await?;
                Ok(Fetched::new(
                    local.into_iter().map(Cached::into_entity).collect(),
                    Origin::Degraded,
                ))
            }
        }
    }

    /// Whether `id` is taken in either store.
    ///
    /// Fails open: an unreachable remote counts as "not found remotely".
    pub async fn exists_anywhere(&self, id: &str) -> Result<bool, AppError> {
        if self.local.get(id).await?.is_some() {
            return Ok(true);
        }

        match self.remote.get(id).await {
            Ok(found) => Ok(found.is_some()),
            Err(error) => {
                self.remote_failed("get", &error);
                Ok(false)
            }
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write-through: local first, then remote.
    ///
    /// The local row is durable before remote is contacted, so cancelling
    /// the returned future after that point never loses it.
    pub async fn write(&self, entity: E) -> Result<Outcome<E>, AppError> {
        if entity.id().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} id cannot be empty",
                E::KIND
            )));
        }

        self.local.put(&self.stamp(entity.clone())).await?;

        match self.remote.put(&entity).await {
            Ok(()) => {
                tracing::debug!(entity = E::KIND, id = entity.id(), "Write synced");
                Ok(Outcome::Synced(entity))
            }
            Err(error) => {
                self.remote_failed("put", &error);
                metrics::PARTIAL_WRITES_TOTAL
                    .with_label_values(&[E::KIND])
                    .inc();
                Ok(Outcome::Partial {
                    value: entity,
                    remote_error: error.to_string(),
                })
            }
        }
    }

    /// Delete-through: remote first, then local regardless of the remote
    /// result so a deletion is never resurrected locally.
    pub async fn delete(&self, id: &str) -> Result<Outcome<()>, AppError> {
        let remote = self.remote.delete(id).await;
        self.local.delete(id).await?;

        match remote {
            Ok(()) => Ok(Outcome::Synced(())),
            Err(error) => {
                self.remote_failed("delete", &error);
                metrics::PARTIAL_WRITES_TOTAL
                    .with_label_values(&[E::KIND])
                    .inc();
                Ok(Outcome::Partial {
                    value: (),
                    remote_error: error.to_string(),
                })
            }
        }
    }

    /// Drop the whole local table (sign-out). Remote is untouched.
    pub async fn clear_local(&self) -> Result<(), AppError> {
        self.local.delete_all().await?;
        tracing::info!(entity = E::KIND, "Local cache cleared");
        Ok(())
    }

    // =========================================================================
    // Bulk
    // =========================================================================

    /// Pull the whole remote collection and upsert it locally.
    ///
    /// Rows that exist only locally are left alone. Unlike per-item reads,
    /// a remote failure is an error here.
    pub async fn bulk_ingest(&self) -> Result<Vec<E>, AppError> {
        let entities = self.remote.list_all().await.map_err(|error| {
            self.remote_failed("list_all", &error);
            AppError::BulkIngest(format!("{}: {error}", E::KIND))
        })?;

        self.cache_all(&entities).await?;
        metrics::INGESTED_ENTITIES_TOTAL
            .with_label_values(&[E::KIND])
            .inc_by(entities.len() as u64);
        tracing::info!(entity = E::KIND, count = entities.len(), "Bulk ingestion finished");

        Ok(entities)
    }

    /// Remote lookup without touching the cache. Errors propagate.
    pub(crate) async fn fetch_remote(&self, id: &str) -> Result<Option<E>, AppError> {
        self.remote.get(id).await
    }

    /// Upsert remote-fetched entities, stamping them with the current time.
    pub(crate) async fn cache_all(&self, entities: &[E]) -> Result<(), AppError> {
        if entities.is_empty() {
            return Ok(());
        }
        let now = self.clock.now_millis();
        let records: Vec<Cached<E>> = entities
            .iter()
            .cloned()
            .map(|entity| Cached::new(entity, now))
            .collect();
        self.local.put_all(&records).await
    }
}
