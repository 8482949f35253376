//! Cache-aside synchronization
//!
//! - `entity`: the record abstraction and freshness-stamped cache rows
//! - `freshness`: freshness window and injectable clock
//! - `ports`: local and remote store interfaces
//! - `engine`: read-through, write-through and delete-through
//! - `ingest`: full-collection reseeding
//! - `memory`: in-memory adapters

mod engine;
mod entity;
mod freshness;
mod ingest;
mod memory;
mod outcome;
mod ports;

pub use engine::SyncEngine;
pub use entity::{Cached, Entity};
pub use freshness::{
    Clock, DEFAULT_FRESHNESS_WINDOW, FreshnessPolicy, ManualClock, SystemClock, is_fresh,
};
pub use ingest::{BulkIngestJob, IngestReport, RecipeFeed};
pub use memory::{MemoryLocalStore, MemoryRemoteStore};
pub use outcome::{Fetched, Origin, Outcome};
pub use ports::{LocalStore, RemoteStore};
