//! Bulk ingestion job
//!
//! Reseeds the local cache from the remote store at session start and on
//! the background refresh interval.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::SyncEngine;
use crate::data::{Recipe, RecipeCard, User};
use crate::error::AppError;

/// Concurrent owner lookups during the recipe join
const OWNER_LOOKUP_CONCURRENCY: usize = 8;

/// Counts from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub users: usize,
    pub recipes: usize,
    pub cards: usize,
}

/// Full-collection pull for users and recipes.
#[derive(Clone)]
pub struct BulkIngestJob {
    users: SyncEngine<User>,
    recipes: SyncEngine<Recipe>,
}

impl BulkIngestJob {
    pub fn new(users: SyncEngine<User>, recipes: SyncEngine<Recipe>) -> Self {
        Self { users, recipes }
    }

    /// Ingest both collections. Any remote failure aborts the run; whatever
    /// was upserted before the failure stays cached.
    pub async fn run(&self) -> Result<IngestReport, AppError> {
        let users = self.users.bulk_ingest().await?;
        let cards = self.recipe_feed().await?;

        let report = IngestReport {
            users: users.len(),
            recipes: cards.recipes,
            cards: cards.cards.len(),
        };
        tracing::info!(
            users = report.users,
            recipes = report.recipes,
            cards = report.cards,
            "Session ingestion complete"
        );
        Ok(report)
    }

    /// Re-run ingestion every `every` in the background. The first run
    /// happens one period after the call; startup ingestion covers time zero.
    pub fn spawn_refresh(self, every: Duration) -> JoinHandle<()> {
        tracing::info!(interval_seconds = every.as_secs(), "Refresh task spawned");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;

            loop {
                interval.tick().await;

                tracing::info!("Running scheduled bulk refresh...");
                match self.run().await {
                    Ok(report) => tracing::info!(
                        users = report.users,
                        recipes = report.recipes,
                        "Bulk refresh completed successfully"
                    ),
                    Err(error) => tracing::error!(%error, "Bulk refresh failed"),
                }
            }
        })
    }

    /// Ingest recipes and join each with its owner's display name.
    ///
    /// Owners are fetched from remote once per distinct `user_id` and cached.
    /// Recipes whose owner no longer exists are cached but get no card.
    pub async fn recipe_feed(&self) -> Result<RecipeFeed, AppError> {
        let recipes = self.recipes.bulk_ingest().await?;
        let owner_ids: BTreeSet<String> = recipes.iter().map(|r| r.user_id.clone()).collect();

        let owners: Vec<User> = stream::iter(owner_ids)
            .map(|id| async move {
                self.users.fetch_remote(&id).await.map_err(|error| {
                    tracing::error!(owner = %id, %error, "Owner lookup failed during ingestion");
                    AppError::BulkIngest(format!("owner {id}: {error}"))
                })
            })
            .buffer_unordered(OWNER_LOOKUP_CONCURRENCY)
            .try_filter_map(|owner| async move { Ok(owner) })
            .try_collect()
            .await?;

        self.users.cache_all(&owners).await?;

        let names: HashMap<&str, &str> = owners
            .iter()
            .map(|owner| (owner.id.as_str(), owner.name.as_str()))
            .collect();

        let total = recipes.len();
        let mut cards: Vec<RecipeCard> = recipes
            .into_iter()
            .filter_map(|recipe| {
                let name = names.get(recipe.user_id.as_str())?.to_string();
                Some(RecipeCard::new(recipe, name))
            })
            .collect();
        cards.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));

        if cards.len() < total {
            tracing::warn!(
                orphaned = total - cards.len(),
                "Recipes without a known owner were left out of the feed"
            );
        }

        Ok(RecipeFeed {
            recipes: total,
            cards,
        })
    }
}

/// Result of a recipe ingestion: the joined cards, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeFeed {
    /// Recipes upserted, including those without a card
    pub recipes: usize,
    pub cards: Vec<RecipeCard>,
}
