//! API layer
//!
//! Loopback JSON API for the app shell:
//! - Users and recipes (read-through / write-through)
//! - Session ingestion and sign-out
//! - Metrics (Prometheus)

mod dto;
pub mod metrics;
mod recipes;
mod sync;
mod users;

pub use dto::*;
pub use metrics::metrics_router;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Create the user, recipe and session routes
pub fn sync_api_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/recipes", get(users::user_recipes))
        .route("/recipes", post(recipes::publish))
        .route("/recipes/search", get(recipes::search))
        .route("/recipes/search/remote", get(recipes::search_remote))
        .route(
            "/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/sync/ingest", post(sync::ingest))
        .route("/session/clear", post(sync::clear_session))
}
