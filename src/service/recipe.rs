//! Recipe service
//!
//! Posting, editing and browsing recipes on top of the sync engine.

use std::sync::Arc;

use serde::Deserialize;

use crate::data::{Database, EntityId, Recipe, RecipeCard};
use crate::error::AppError;
use crate::sync::{BulkIngestJob, Fetched, Outcome, RecipeFeed, SyncEngine};

/// Attempts at drawing an unused recipe id before giving up
const MAX_ID_ATTEMPTS: usize = 5;

/// Document field searched by remote prefix queries
const TITLE_FIELD: &str = "title";

/// A recipe as submitted for publishing; id and upload date are assigned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub picture: String,
    pub user_id: String,
}

/// Partial recipe edit. Owner and upload date are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub picture: Option<String>,
}

/// Recipe service
#[derive(Clone)]
pub struct RecipeService {
    recipes: SyncEngine<Recipe>,
    ingest: BulkIngestJob,
    db: Arc<Database>,
}

impl RecipeService {
    /// Create new recipe service
    pub fn new(recipes: SyncEngine<Recipe>, ingest: BulkIngestJob, db: Arc<Database>) -> Self {
        Self {
            recipes,
            ingest,
            db,
        }
    }

    /// Publish a new recipe under a fresh id.
    ///
    /// # Errors
    /// `Validation` for a blank title or owner, `Conflict` if no unused id
    /// could be drawn.
    pub async fn publish(&self, draft: RecipeDraft) -> Result<Outcome<Recipe>, AppError> {
        let title = required(&draft.title, "title")?;
        let user_id = required(&draft.user_id, "userId")?;
        let id = self.unused_id().await?;

        let recipe = Recipe {
            id,
            title,
            content: draft.content,
            picture: draft.picture.trim().to_string(),
            upload_date: self.recipes.now_millis(),
            user_id,
        };

        let outcome = self.recipes.write(recipe).await?;
        tracing::info!(
            recipe_id = %outcome.value().id,
            remote_synced = outcome.remote_synced(),
            "Recipe published"
        );
        Ok(outcome)
    }

    /// Apply `patch` to an existing recipe and write it through.
    pub async fn update(&self, id: &str, patch: RecipePatch) -> Result<Outcome<Recipe>, AppError> {
        let mut recipe = self.get(id).await?.into_value();

        if let Some(title) = patch.title {
            recipe.title = required(&title, "title")?;
        }
        if let Some(content) = patch.content {
            recipe.content = content;
        }
        if let Some(picture) = patch.picture {
            recipe.picture = picture.trim().to_string();
        }

        self.recipes.write(recipe).await
    }

    pub async fn remove(&self, id: &str) -> Result<Outcome<()>, AppError> {
        self.recipes.delete(id).await
    }

    pub async fn get(&self, id: &str) -> Result<Fetched<Recipe>, AppError> {
        self.recipes.read_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Every recipe posted by `user_id`.
    pub async fn by_owner(&self, user_id: &str) -> Result<Fetched<Vec<Recipe>>, AppError> {
        self.recipes.list_by_foreign_key(user_id).await
    }

    /// Offline search over cached recipes by title or author name.
    pub async fn search(&self, query: &str) -> Result<Vec<RecipeCard>, AppError> {
        self.db.search_recipe_cards(query.trim()).await
    }

    /// Remote title-prefix search, falling back to the cache when offline.
    pub async fn search_remote(&self, prefix: &str) -> Result<Fetched<Vec<Recipe>>, AppError> {
        self.recipes.search_by_prefix(TITLE_FIELD, prefix).await
    }

    /// Refresh the cache from remote and return the joined feed.
    pub async fn feed(&self) -> Result<RecipeFeed, AppError> {
        self.ingest.recipe_feed().await
    }

    async fn unused_id(&self) -> Result<String, AppError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = EntityId::new().0;
            if !self.recipes.exists_anywhere(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(candidate = %candidate, "Recipe id collision, drawing again");
        }
        Err(AppError::Conflict(
            "could not allocate an unused recipe id".to_string(),
        ))
    }
}

/// Trimmed, non-empty field value.
pub(crate) fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
