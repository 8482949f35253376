//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::data::{Recipe, User};
use crate::sync::Entity;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Cache Metrics
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_cache_hits_total", "Reads served from a fresh local copy"),
        &["entity"]
    ).expect("metric can be created");
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_cache_misses_total", "Reads that had to consult the remote store"),
        &["entity"]
    ).expect("metric can be created");
    pub static ref DEGRADED_READS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_degraded_reads_total", "Reads answered from local data after a remote failure"),
        &["entity"]
    ).expect("metric can be created");

    // Remote Metrics
    pub static ref REMOTE_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_remote_failures_total", "Remote store calls that failed"),
        &["entity", "operation"]
    ).expect("metric can be created");
    pub static ref PARTIAL_WRITES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_partial_writes_total", "Writes or deletes applied locally but not remotely"),
        &["entity"]
    ).expect("metric can be created");

    // Ingestion Metrics
    pub static ref INGESTED_ENTITIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_ingested_entities_total", "Entities written to the local store by bulk ingestion"),
        &["entity"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("goodfood_errors_total", "Errors returned by the local API"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Entity labels known at startup
const ENTITY_KINDS: [&str; 2] = [User::KIND, Recipe::KIND];

/// Initialize metrics registry.
///
/// Safe to call more than once; repeated registrations are ignored.
pub fn init_metrics() {
    let collectors: [(&str, Box<dyn prometheus::core::Collector>); 7] = [
        ("CACHE_HITS_TOTAL", Box::new(CACHE_HITS_TOTAL.clone())),
        ("CACHE_MISSES_TOTAL", Box::new(CACHE_MISSES_TOTAL.clone())),
        ("DEGRADED_READS_TOTAL", Box::new(DEGRADED_READS_TOTAL.clone())),
        ("REMOTE_FAILURES_TOTAL", Box::new(REMOTE_FAILURES_TOTAL.clone())),
        ("PARTIAL_WRITES_TOTAL", Box::new(PARTIAL_WRITES_TOTAL.clone())),
        (
            "INGESTED_ENTITIES_TOTAL",
            Box::new(INGESTED_ENTITIES_TOTAL.clone()),
        ),
        ("ERRORS_TOTAL", Box::new(ERRORS_TOTAL.clone())),
    ];

    for (name, collector) in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(error) => tracing::warn!(metric = name, %error, "Failed to register metric"),
        }
    }

    // Vectors stay out of the exposition until a label set exists
    for entity in ENTITY_KINDS {
        for counter in [
            &*CACHE_HITS_TOTAL,
            &*CACHE_MISSES_TOTAL,
            &*DEGRADED_READS_TOTAL,
            &*PARTIAL_WRITES_TOTAL,
            &*INGESTED_ENTITIES_TOTAL,
        ] {
            counter.with_label_values(&[entity]);
        }
    }

    tracing::info!("Metrics registry initialized");
}

/// Record a failed remote call.
pub fn remote_failure(entity: &str, operation: &str) {
    REMOTE_FAILURES_TOTAL
        .with_label_values(&[entity, operation])
        .inc();
}
