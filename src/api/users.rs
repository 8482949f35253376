//! User endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::dto::{ReadResponse, WriteResponse};
use crate::AppState;
use crate::data::{Recipe, User};
use crate::error::AppError;
use crate::service::{NewUser, ProfileUpdate};

/// POST /users
pub async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<WriteResponse<User>, AppError> {
    Ok(state.users.register(new_user).await?.into())
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReadResponse<User>>, AppError> {
    Ok(Json(state.users.get(&id).await?.into()))
}

/// PUT /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<WriteResponse<User>, AppError> {
    Ok(state.users.update_profile(&id, update).await?.into())
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<WriteResponse<()>, AppError> {
    Ok(state.users.remove(&id).await?.into())
}

/// GET /users/:id/recipes
pub async fn user_recipes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReadResponse<Vec<Recipe>>>, AppError> {
    Ok(Json(state.recipes.by_owner(&id).await?.into()))
}
