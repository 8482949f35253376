//! Tagged results returned by the sync engine

use serde::Serialize;

/// Where a read was satisfied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Fresh local copy, no remote call made.
    LocalFresh,
    /// Fetched from the remote store and re-cached.
    Remote,
    /// Remote answered but had nothing newer; stale local copy returned.
    LocalStale,
    /// Remote failed; local copy (fresh or stale) returned.
    Degraded,
}

impl Origin {
    pub fn is_degraded(self) -> bool {
        matches!(self, Origin::Degraded)
    }
}

/// A read result and its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    pub fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Result of a write-through or delete-through.
///
/// The local leg always completed when an `Outcome` is returned; `Partial`
/// means the remote leg did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Synced(T),
    Partial { value: T, remote_error: String },
}

impl<T> Outcome<T> {
    pub fn remote_synced(&self) -> bool {
        matches!(self, Outcome::Synced(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Synced(value) | Outcome::Partial { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Synced(value) | Outcome::Partial { value, .. } => value,
        }
    }

    pub fn remote_error(&self) -> Option<&str> {
        match self {
            Outcome::Synced(_) => None,
            Outcome::Partial { remote_error, .. } => Some(remote_error),
        }
    }
}
