//! Store adapters consumed by the sync engine
//!
//! Both traits are per entity type. Implementations must be safe to share
//! across concurrent tasks.

use async_trait::async_trait;

use super::entity::{Cached, Entity};
use crate::error::AppError;

/// Durable on-device cache.
///
/// Strongly consistent with its own most recent write and free of any
/// caching of its own. Errors are storage-medium faults and are never
/// retried by the engine.
#[async_trait]
pub trait LocalStore<E: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Cached<E>>, AppError>;

    /// Insert or overwrite one row.
    async fn put(&self, record: &Cached<E>) -> Result<(), AppError>;

    /// Insert or overwrite many rows.
    async fn put_all(&self, records: &[Cached<E>]) -> Result<(), AppError>;

    /// Delete one row; deleting a missing row is not an error.
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Drop every row (session clear).
    async fn delete_all(&self) -> Result<(), AppError>;

    async fn query_by_foreign_key(&self, fk: &str) -> Result<Vec<Cached<E>>, AppError>;

    /// Case-insensitive substring search.
    async fn query_by_text(&self, needle: &str) -> Result<Vec<Cached<E>>, AppError>;
}

/// Authoritative, best-effort remote document store.
///
/// Any network, auth or serialization failure is an error. No retries.
#[async_trait]
pub trait RemoteStore<E: Entity>: Send + Sync {
    /// `Ok(None)` means the store answered and has no such document.
    async fn get(&self, id: &str) -> Result<Option<E>, AppError>;

    async fn put(&self, entity: &E) -> Result<(), AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;

    async fn list_all(&self) -> Result<Vec<E>, AppError>;

    /// Equality query on [`Entity::FOREIGN_KEY_FIELD`].
    async fn query_by_foreign_key(&self, fk: &str) -> Result<Vec<E>, AppError>;

    /// "Starts with" query emulated by a lexicographic range scan from
    /// `prefix` to `prefix` + [`PREFIX_SENTINEL`](crate::remote::PREFIX_SENTINEL).
    async fn query_by_prefix(&self, field: &str, prefix: &str) -> Result<Vec<E>, AppError>;
}
