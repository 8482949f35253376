//! goodfood-sync - cache-aside synchronization for a recipe-sharing app
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Local API Layer (Axum)                      │
//! │  - Users, recipes, search                                   │
//! │  - Session ingestion / sign-out, metrics                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Validation, id allocation                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Sync Engine (per entity)                    │
//! │  - Freshness policy, read/write/delete-through              │
//! │  - Bulk ingestion                                           │
//! └─────────────────────────────────────────────────────────────┘
//!            │                                   │
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │  Local store (SQLite)    │   │  Remote store (HTTP docs)    │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for the loopback API
//! - `service`: Business logic layer
//! - `sync`: Sync engine, freshness policy, store ports
//! - `data`: SQLite cache and data models
//! - `remote`: Remote document store client
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod remote;
pub mod service;
pub mod sync;

use std::sync::Arc;

use data::{Database, Recipe, User};
use remote::HttpDocumentStore;
use service::{RecipeService, UserService};
use sync::{BulkIngestJob, Clock, FreshnessPolicy, LocalStore, RemoteStore, SyncEngine, SystemClock};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub recipes: RecipeService,

    /// Session-start and background refresh
    pub ingest: BulkIngestJob,
}

impl AppState {
    /// Initialize application state against the configured remote store
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the HTTP client
    /// cannot be built
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = Arc::new(Database::connect(&config.database.path).await?);

        let http_client = remote::build_http_client(&config.remote)?;
        let user_remote: Arc<dyn RemoteStore<User>> = Arc::new(HttpDocumentStore::from_config(
            http_client.clone(),
            &config.remote,
        ));
        let recipe_remote: Arc<dyn RemoteStore<Recipe>> =
            Arc::new(HttpDocumentStore::from_config(http_client, &config.remote));
        tracing::info!(base_url = %config.remote.base_url, "Remote store configured");

        let state = Self::from_parts(
            &config,
            db,
            user_remote,
            recipe_remote,
            Arc::new(SystemClock),
        );
        tracing::info!("Application state initialized successfully");
        Ok(state)
    }

    /// Wire services from already-built parts. The database serves as the
    /// local store for both entity types.
    pub fn from_parts(
        config: &config::AppConfig,
        db: Arc<Database>,
        user_remote: Arc<dyn RemoteStore<User>>,
        recipe_remote: Arc<dyn RemoteStore<Recipe>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = FreshnessPolicy::new(config.sync.freshness_window());

        let user_local: Arc<dyn LocalStore<User>> = db.clone();
        let recipe_local: Arc<dyn LocalStore<Recipe>> = db.clone();

        let users = SyncEngine::new(user_local, user_remote, clock.clone(), policy);
        let recipes = SyncEngine::new(recipe_local, recipe_remote, clock, policy);
        let ingest = BulkIngestJob::new(users.clone(), recipes.clone());

        Self {
            users: UserService::new(users, recipes.clone()),
            recipes: RecipeService::new(recipes, ingest.clone(), db),
            ingest,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::sync_api_router())
        .layer(TraceLayer::new_for_http())
        // loopback only; the app shell is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
