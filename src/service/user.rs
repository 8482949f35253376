//! User service
//!
//! Registration, profile edits and session sign-out.

use serde::Deserialize;

use super::recipe::required;
use crate::data::{Recipe, User};
use crate::error::AppError;
use crate::sync::{Fetched, Outcome, SyncEngine};

/// Registration request. The id comes from the identity provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(rename = "userId")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub profile_pic: String,
}

/// Partial profile edit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

/// User service
#[derive(Clone)]
pub struct UserService {
    users: SyncEngine<User>,
    recipes: SyncEngine<Recipe>,
}

impl UserService {
    /// Create new user service
    pub fn new(users: SyncEngine<User>, recipes: SyncEngine<Recipe>) -> Self {
        Self { users, recipes }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// `Conflict` if the id is already taken locally or remotely.
    pub async fn register(&self, new_user: NewUser) -> Result<Outcome<User>, AppError> {
        let id = required(&new_user.id, "userId")?;
        let email = validate_email(&new_user.email)?;
        let name = required(&new_user.name, "name")?;

        if self.users.exists_anywhere(&id).await? {
            return Err(AppError::Conflict(format!("user {id} already exists")));
        }

        let user = User {
            id,
            email,
            name,
            profile_pic: new_user.profile_pic.trim().to_string(),
            signup_date: self.users.now_millis(),
        };

        let outcome = self.users.write(user).await?;
        tracing::info!(
            user_id = %outcome.value().id,
            remote_synced = outcome.remote_synced(),
            "User registered"
        );
        Ok(outcome)
    }

    /// Apply `update` to an existing profile and write it through.
    pub async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<Outcome<User>, AppError> {
        let mut user = self.get(id).await?.into_value();

        if let Some(name) = update.name {
            user.name = required(&name, "name")?;
        }
        if let Some(email) = update.email {
            user.email = validate_email(&email)?;
        }
        if let Some(profile_pic) = update.profile_pic {
            user.profile_pic = profile_pic.trim().to_string();
        }

        self.users.write(user).await
    }

    pub async fn get(&self, id: &str) -> Result<Fetched<User>, AppError> {
        self.users.read_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Delete the account from both stores. Recipes are left to their owner.
    pub async fn remove(&self, id: &str) -> Result<Outcome<()>, AppError> {
        self.users.delete(id).await
    }

    /// Drop every cached user and recipe. Remote data is untouched.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.recipes.clear_local().await?;
        self.users.clear_local().await?;
        tracing::info!("Session cleared");
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<String, AppError> {
    let email = required(email, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::Validation(format!("invalid email: {email}"))),
    }
}
