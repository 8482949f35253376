//! Entity abstraction shared by both stores

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record the sync engine can move between the local cache and the
/// remote document store.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Remote collection name and metrics label.
    const KIND: &'static str;

    /// Document field that holds the foreign key, if the entity has one.
    const FOREIGN_KEY_FIELD: Option<&'static str> = None;

    /// Identifier, the sole key in both stores.
    fn id(&self) -> &str;

    fn foreign_key(&self) -> Option<&str> {
        None
    }

    /// Case-insensitive substring match used for offline search.
    fn matches_text(&self, needle: &str) -> bool;
}

/// A locally cached entity together with its freshness stamp.
///
/// `cached_at` is the instant (epoch millis) the copy was last considered
/// authoritative. It is kept apart from the entity's own dates so a cache
/// refresh never rewrites what the user sees as "uploaded on".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<E> {
    pub entity: E,
    pub cached_at: i64,
}

impl<E> Cached<E> {
    pub fn new(entity: E, cached_at: i64) -> Self {
        Self { entity, cached_at }
    }

    pub fn into_entity(self) -> E {
        self.entity
    }
}
