//! Common test utilities for E2E tests
//!
//! - `FakeDocumentStore`: in-process document store speaking the remote
//!   REST protocol, with an offline switch
//! - `TestServer`: the local API wired to a fake store and a temp database

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use goodfood_sync::remote::{DocumentList, StructuredQuery};
use goodfood_sync::{AppState, config};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

type Collections = HashMap<String, BTreeMap<String, Value>>;

#[derive(Default)]
struct FakeStoreState {
    collections: RwLock<Collections>,
    offline: AtomicBool,
    requests: AtomicUsize,
}

impl FakeStoreState {
    fn enter(&self) -> Result<(), StatusCode> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Ok(())
    }
}

/// Fake remote document store on a random local port
pub struct FakeDocumentStore {
    pub addr: String,
    state: Arc<FakeStoreState>,
}

impl FakeDocumentStore {
    pub async fn start() -> Self {
        let state = Arc::new(FakeStoreState::default());

        let app = Router::new()
            .route("/v1/collections/:collection", post(run_query))
            .route("/v1/collections/:collection/documents", get(list_documents))
            .route(
                "/v1/collections/:collection/documents/:id",
                get(get_document)
                    .put(put_document)
                    .delete(delete_document),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// While offline every request answers 503
    pub fn set_offline(&self, offline: bool) {
        self.state.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests received so far, including rejected ones
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub async fn insert(&self, collection: &str, id: &str, document: Value) {
        self.state
            .collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
    }

    pub async fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.state
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned()
    }
}

async fn get_document(
    State(state): State<Arc<FakeStoreState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    state.enter()?;
    state
        .collections
        .read()
        .await
        .get(&collection)
        .and_then(|documents| documents.get(&id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn put_document(
    State(state): State<Arc<FakeStoreState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(document): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    state.enter()?;
    state
        .collections
        .write()
        .await
        .entry(collection)
        .or_default()
        .insert(id, document);
    Ok(StatusCode::OK)
}

async fn delete_document(
    State(state): State<Arc<FakeStoreState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    state.enter()?;
    let removed = state
        .collections
        .write()
        .await
        .get_mut(&collection)
        .and_then(|documents| documents.remove(&id));
    match removed {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn list_documents(
    State(state): State<Arc<FakeStoreState>>,
    Path(collection): Path<String>,
) -> Result<Json<DocumentList<Value>>, StatusCode> {
    state.enter()?;
    let documents = state
        .collections
        .read()
        .await
        .get(&collection)
        .map(|documents| documents.values().cloned().collect())
        .unwrap_or_default();
    Ok(Json(DocumentList { documents }))
}

async fn run_query(
    State(state): State<Arc<FakeStoreState>>,
    // `{collection}:query`
    Path(target): Path<String>,
    Json(query): Json<StructuredQuery>,
) -> Result<Json<DocumentList<Value>>, StatusCode> {
    state.enter()?;
    let collection = target.strip_suffix(":query").ok_or(StatusCode::NOT_FOUND)?;
    let documents = state
        .collections
        .read()
        .await
        .get(collection)
        .map(|documents| {
            documents
                .values()
                .filter(|document| query.matches(document))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(DocumentList { documents }))
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub remote: FakeDocumentStore,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance backed by a fresh fake remote
    pub async fn new() -> Self {
        let remote = FakeDocumentStore::start().await;
        Self::with_remote(remote).await
    }

    pub async fn with_remote(remote: FakeDocumentStore) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = test_config(db_path, &remote.addr);
        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let app = goodfood_sync::build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            remote,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

pub fn test_config(db_path: std::path::PathBuf, remote_url: &str) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
        },
        database: config::DatabaseConfig { path: db_path },
        remote: config::RemoteConfig {
            base_url: remote_url.to_string(),
            api_key: Some("test-key".to_string()),
            timeout_seconds: 5,
        },
        sync: config::SyncConfig::default(),
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}
