//! Data layer module
//!
//! - SQLite local cache for users and recipes
//! - Plain data models shared with the remote store

mod database;
mod models;

pub use database::Database;
pub use models::*;

#[cfg(test)]
mod database_test;
