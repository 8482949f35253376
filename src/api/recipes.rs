//! Recipe endpoints

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use super::dto::{PrefixParams, ReadResponse, SearchParams, WriteResponse};
use crate::AppState;
use crate::data::{Recipe, RecipeCard};
use crate::error::AppError;
use crate::service::{RecipeDraft, RecipePatch};

/// POST /recipes
pub async fn publish(
    State(state): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> Result<WriteResponse<Recipe>, AppError> {
    Ok(state.recipes.publish(draft).await?.into())
}

/// GET /recipes/:id
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReadResponse<Recipe>>, AppError> {
    Ok(Json(state.recipes.get(&id).await?.into()))
}

/// PUT /recipes/:id
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<RecipePatch>,
) -> Result<WriteResponse<Recipe>, AppError> {
    Ok(state.recipes.update(&id, patch).await?.into())
}

/// DELETE /recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<WriteResponse<()>, AppError> {
    Ok(state.recipes.remove(&id).await?.into())
}

/// GET /recipes/search?q=
///
/// Offline; never touches the remote store.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RecipeCard>>, AppError> {
    Ok(Json(state.recipes.search(&params.q).await?))
}

/// GET /recipes/search/remote?prefix=
pub async fn search_remote(
    State(state): State<AppState>,
    Query(params): Query<PrefixParams>,
) -> Result<Json<ReadResponse<Vec<Recipe>>>, AppError> {
    if params.prefix.is_empty() {
        return Err(AppError::Validation("prefix cannot be empty".to_string()));
    }
    Ok(Json(state.recipes.search_remote(&params.prefix).await?.into()))
}
