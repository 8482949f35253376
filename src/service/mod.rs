//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services validate input and drive the sync engines.

mod recipe;
mod user;

pub use recipe::{RecipeDraft, RecipePatch, RecipeService};
pub use user::{NewUser, ProfileUpdate, UserService};
