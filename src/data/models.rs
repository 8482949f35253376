//! Data models
//!
//! Plain records shared by the local cache, the remote document store and
//! the local API. Field names on the wire are camelCase to match the
//! document store.

use serde::{Deserialize, Serialize};

use crate::sync::Entity;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Client-generated, so collisions are only checked, never coordinated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
// User
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userId")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Profile picture URL, empty when unset
    #[serde(default)]
    pub profile_pic: String,
    /// Signup time (epoch millis)
    #[serde(default)]
    pub signup_date: i64,
}

impl Entity for User {
    const KIND: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn matches_text(&self, needle: &str) -> bool {
        contains_ignore_case(&self.name, needle) || contains_ignore_case(&self.email, needle)
    }
}

// =============================================================================
// Recipe
// =============================================================================

/// A posted recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "recipeId")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Picture URL, empty when unset
    #[serde(default)]
    pub picture: String,
    /// Upload time (epoch millis)
    #[serde(default)]
    pub upload_date: i64,
    /// Owning user (not enforced)
    #[serde(default)]
    pub user_id: String,
}

impl Entity for Recipe {
    const KIND: &'static str = "recipes";
    const FOREIGN_KEY_FIELD: Option<&'static str> = Some("userId");

    fn id(&self) -> &str {
        &self.id
    }

    fn foreign_key(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    /// Title match only; author names need a join the in-memory store
    /// cannot do.
    fn matches_text(&self, needle: &str) -> bool {
        contains_ignore_case(&self.title, needle)
    }
}

/// Recipe joined with its owner's display name, for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCard {
    #[serde(rename = "recipeId")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub picture: String,
    pub upload_date: i64,
    pub user_id: String,
    pub user_name: String,
}

impl RecipeCard {
    pub fn new(recipe: Recipe, user_name: impl Into<String>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            content: recipe.content,
            picture: recipe.picture,
            upload_date: recipe.upload_date,
            user_id: recipe.user_id,
            user_name: user_name.into(),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_uses_document_field_names() {
        let recipe = Recipe {
            id: "r1".to_string(),
            title: "Soup".to_string(),
            content: "Boil water".to_string(),
            picture: String::new(),
            upload_date: 42,
            user_id: "u1".to_string(),
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["recipeId"], "r1");
        assert_eq!(value["uploadDate"], 42);
        assert_eq!(value["userId"], "u1");
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "name": "Ada"
        }))
        .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.profile_pic, "");
        assert_eq!(user.signup_date, 0);
    }

    #[test]
    fn text_match_is_case_insensitive() {
        let user = User {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
            profile_pic: String::new(),
            signup_date: 0,
        };
        assert!(user.matches_text("LOVE"));
        assert!(user.matches_text("example"));
        assert!(!user.matches_text("babbage"));
    }

    #[test]
    fn entity_ids_are_unique_ulids() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_eq!(a.0.len(), 26);
        assert_ne!(a, b);
    }
}
