//! SQLite database operations
//!
//! The durable local cache. Implements the local store port for users and
//! recipes; every row carries its own `cached_at` freshness stamp.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use super::models::*;
use crate::error::AppError;
use crate::sync::{Cached, LocalStore};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!("Migration failed: {}", e))?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Recipe cards
    // =========================================================================

    /// Offline search returning recipes joined with their owner's name.
    ///
    /// Matches title or owner name, case-insensitively. Recipes whose owner
    /// is not cached are still returned with an empty name. Newest first.
    pub async fn search_recipe_cards(&self, query: &str) -> Result<Vec<RecipeCard>, AppError> {
        let cards = sqlx::query_as::<_, RecipeCard>(
            r#"
            SELECT r.id, r.title, r.content, r.picture, r.upload_date, r.user_id,
                   COALESCE(u.name, '') AS user_name
            FROM recipes r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE instr(lower(r.title), lower(?)) > 0
               OR instr(lower(COALESCE(u.name, '')), lower(?)) > 0
            ORDER BY r.upload_date DESC
            "#,
        )
        .bind(query)
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    profile_pic: String,
    signup_date: i64,
    cached_at: i64,
}

impl From<UserRow> for Cached<User> {
    fn from(row: UserRow) -> Self {
        Cached::new(
            User {
                id: row.id,
                email: row.email,
                name: row.name,
                profile_pic: row.profile_pic,
                signup_date: row.signup_date,
            },
            row.cached_at,
        )
    }
}

const UPSERT_USER: &str = r#"
    INSERT INTO users (id, email, name, profile_pic, signup_date, cached_at)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        email = excluded.email,
        name = excluded.name,
        profile_pic = excluded.profile_pic,
        signup_date = excluded.signup_date,
        cached_at = excluded.cached_at
"#;

fn bind_user<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    record: &'q Cached<User>,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let user = &record.entity;
    query
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.profile_pic)
        .bind(user.signup_date)
        .bind(record.cached_at)
}

#[async_trait]
impl LocalStore<User> for Database {
    async fn get(&self, id: &str) -> Result<Option<Cached<User>>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn put(&self, record: &Cached<User>) -> Result<(), AppError> {
        bind_user(sqlx::query(UPSERT_USER), record)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn put_all(&self, records: &[Cached<User>]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            bind_user(sqlx::query(UPSERT_USER), record)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }

    /// Users have no foreign key.
    async fn query_by_foreign_key(&self, _fk: &str) -> Result<Vec<Cached<User>>, AppError> {
        Ok(Vec::new())
    }

    async fn query_by_text(&self, needle: &str) -> Result<Vec<Cached<User>>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT * FROM users
            WHERE instr(lower(name), lower(?)) > 0
               OR instr(lower(email), lower(?)) > 0
            ORDER BY name
            "#,
        )
        .bind(needle)
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Recipes
// =============================================================================

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: String,
    title: String,
    content: String,
    picture: String,
    upload_date: i64,
    user_id: String,
    cached_at: i64,
}

impl From<RecipeRow> for Cached<Recipe> {
    fn from(row: RecipeRow) -> Self {
        Cached::new(
            Recipe {
                id: row.id,
                title: row.title,
                content: row.content,
                picture: row.picture,
                upload_date: row.upload_date,
                user_id: row.user_id,
            },
            row.cached_at,
        )
    }
}

const UPSERT_RECIPE: &str = r#"
    INSERT INTO recipes (id, title, content, picture, upload_date, user_id, cached_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        content = excluded.content,
        picture = excluded.picture,
        upload_date = excluded.upload_date,
        user_id = excluded.user_id,
        cached_at = excluded.cached_at
"#;

fn bind_recipe<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    record: &'q Cached<Recipe>,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let recipe = &record.entity;
    query
        .bind(&recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.content)
        .bind(&recipe.picture)
        .bind(recipe.upload_date)
        .bind(&recipe.user_id)
        .bind(record.cached_at)
}

#[async_trait]
impl LocalStore<Recipe> for Database {
    async fn get(&self, id: &str) -> Result<Option<Cached<Recipe>>, AppError> {
        let row = sqlx::query_as::<_, RecipeRow>("SELECT * FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn put(&self, record: &Cached<Recipe>) -> Result<(), AppError> {
        bind_recipe(sqlx::query(UPSERT_RECIPE), record)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn put_all(&self, records: &[Cached<Recipe>]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            bind_recipe(sqlx::query(UPSERT_RECIPE), record)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM recipes")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query_by_foreign_key(&self, fk: &str) -> Result<Vec<Cached<Recipe>>, AppError> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            "SELECT * FROM recipes WHERE user_id = ? ORDER BY upload_date DESC",
        )
        .bind(fk)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Title or owner display name, case-insensitive.
    async fn query_by_text(&self, needle: &str) -> Result<Vec<Cached<Recipe>>, AppError> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT r.* FROM recipes r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE instr(lower(r.title), lower(?)) > 0
               OR instr(lower(COALESCE(u.name, '')), lower(?)) > 0
            ORDER BY r.upload_date DESC
            "#,
        )
        .bind(needle)
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
