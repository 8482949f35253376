//! Database tests

use super::*;
use crate::sync::{Cached, LocalStore};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn test_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        name: name.to_string(),
        profile_pic: String::new(),
        signup_date: 1_000,
    }
}

fn test_recipe(id: &str, title: &str, user_id: &str, upload_date: i64) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
        content: "Mix everything".to_string(),
        picture: "https://cdn.example.com/pic.jpg".to_string(),
        upload_date,
        user_id: user_id.to_string(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_reconnect_keeps_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("test.db");

    let db = Database::connect(&db_path).await.unwrap();
    db.put(&Cached::new(test_user("u1", "Ada"), 5))
        .await
        .unwrap();
    drop(db);

    let db = Database::connect(&db_path).await.unwrap();
    let user: Option<Cached<User>> = db.get("u1").await.unwrap();
    assert_eq!(user.unwrap().cached_at, 5);
}

#[tokio::test]
async fn test_user_upsert_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let record = Cached::new(test_user("u1", "Ada"), 100);
    db.put(&record).await.unwrap();

    let retrieved: Cached<User> = db.get("u1").await.unwrap().unwrap();
    assert_eq!(retrieved, record);

    // Upsert replaces every field, including the freshness stamp
    let mut renamed = test_user("u1", "Ada Lovelace");
    renamed.profile_pic = "https://cdn.example.com/ada.png".to_string();
    db.put(&Cached::new(renamed.clone(), 200)).await.unwrap();

    let retrieved: Cached<User> = db.get("u1").await.unwrap().unwrap();
    assert_eq!(retrieved.entity, renamed);
    assert_eq!(retrieved.cached_at, 200);
    assert_eq!(retrieved.entity.signup_date, 1_000);
}

#[tokio::test]
async fn test_missing_rows_are_none() {
    let (db, _temp_dir) = create_test_db().await;

    let user: Option<Cached<User>> = db.get("nobody").await.unwrap();
    let recipe: Option<Cached<Recipe>> = db.get("nothing").await.unwrap();
    assert!(user.is_none());
    assert!(recipe.is_none());
}

#[tokio::test]
async fn test_recipe_crud() {
    let (db, _temp_dir) = create_test_db().await;

    let record = Cached::new(test_recipe("r1", "Soup", "u1", 42), 100);
    db.put(&record).await.unwrap();

    let retrieved: Cached<Recipe> = db.get("r1").await.unwrap().unwrap();
    assert_eq!(retrieved, record);
    assert_eq!(retrieved.entity.upload_date, 42);

    LocalStore::<Recipe>::delete(&db, "r1").await.unwrap();
    let retrieved: Option<Cached<Recipe>> = db.get("r1").await.unwrap();
    assert!(retrieved.is_none());

    // deleting an absent row is not an error
    LocalStore::<Recipe>::delete(&db, "r1").await.unwrap();
}

#[tokio::test]
async fn test_put_all_is_an_upsert() {
    let (db, _temp_dir) = create_test_db().await;

    db.put(&Cached::new(test_recipe("r1", "Old", "u1", 1), 1))
        .await
        .unwrap();
    db.put_all(&[
        Cached::new(test_recipe("r1", "New", "u1", 1), 50),
        Cached::new(test_recipe("r2", "Stew", "u2", 2), 50),
    ])
    .await
    .unwrap();

    let r1: Cached<Recipe> = db.get("r1").await.unwrap().unwrap();
    assert_eq!(r1.entity.title, "New");
    assert_eq!(r1.cached_at, 50);
    let r2: Option<Cached<Recipe>> = db.get("r2").await.unwrap();
    assert!(r2.is_some());
}

#[tokio::test]
async fn test_recipes_by_owner() {
    let (db, _temp_dir) = create_test_db().await;

    db.put_all(&[
        Cached::new(test_recipe("r1", "Soup", "u1", 10), 0),
        Cached::new(test_recipe("r2", "Stew", "u2", 20), 0),
        Cached::new(test_recipe("r3", "Pie", "u1", 30), 0),
    ])
    .await
    .unwrap();

    let owned: Vec<Cached<Recipe>> = db.query_by_foreign_key("u1").await.unwrap();
    let ids: Vec<_> = owned.iter().map(|r| r.entity.id.as_str()).collect();
    assert_eq!(ids, ["r3", "r1"]);

    let none: Vec<Cached<Recipe>> = db.query_by_foreign_key("u9").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_recipe_text_search_matches_title_or_owner() {
    let (db, _temp_dir) = create_test_db().await;

    db.put(&Cached::new(test_user("u1", "Julia Child"), 0))
        .await
        .unwrap();
    db.put_all(&[
        Cached::new(test_recipe("r1", "French Onion Soup", "u1", 10), 0),
        Cached::new(test_recipe("r2", "Boeuf Bourguignon", "u1", 20), 0),
        Cached::new(test_recipe("r3", "Pad Thai", "u2", 30), 0),
    ])
    .await
    .unwrap();

    let by_title: Vec<Cached<Recipe>> = db.query_by_text("soup").await.unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].entity.id, "r1");

    let by_owner: Vec<Cached<Recipe>> = db.query_by_text("JULIA").await.unwrap();
    assert_eq!(by_owner.len(), 2);

    // LIKE wildcards are treated literally
    let wildcard: Vec<Cached<Recipe>> = db.query_by_text("%").await.unwrap();
    assert!(wildcard.is_empty());
}

#[tokio::test]
async fn test_search_recipe_cards() {
    let (db, _temp_dir) = create_test_db().await;

    db.put(&Cached::new(test_user("u1", "Julia Child"), 0))
        .await
        .unwrap();
    db.put_all(&[
        Cached::new(test_recipe("r1", "Onion Soup", "u1", 10), 0),
        Cached::new(test_recipe("r2", "Miso Soup", "ghost", 20), 0),
    ])
    .await
    .unwrap();

    let cards = db.search_recipe_cards("soup").await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id, "r2");
    assert_eq!(cards[0].user_name, "");
    assert_eq!(cards[1].user_name, "Julia Child");
}

#[tokio::test]
async fn test_user_text_search() {
    let (db, _temp_dir) = create_test_db().await;

    db.put_all(&[
        Cached::new(test_user("ada", "Ada Lovelace"), 0),
        Cached::new(test_user("grace", "Grace Hopper"), 0),
    ])
    .await
    .unwrap();

    let found: Vec<Cached<User>> = db.query_by_text("hopper").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].entity.id, "grace");

    let by_email: Vec<Cached<User>> = db.query_by_text("ada@").await.unwrap();
    assert_eq!(by_email.len(), 1);

    let no_fk: Vec<Cached<User>> = db.query_by_foreign_key("ada").await.unwrap();
    assert!(no_fk.is_empty());
}

#[tokio::test]
async fn test_delete_all_clears_one_table() {
    let (db, _temp_dir) = create_test_db().await;

    db.put(&Cached::new(test_user("u1", "Ada"), 0))
        .await
        .unwrap();
    db.put(&Cached::new(test_recipe("r1", "Soup", "u1", 0), 0))
        .await
        .unwrap();

    LocalStore::<Recipe>::delete_all(&db).await.unwrap();

    let recipe: Option<Cached<Recipe>> = db.get("r1").await.unwrap();
    let user: Option<Cached<User>> = db.get("u1").await.unwrap();
    assert!(recipe.is_none());
    assert!(user.is_some());
}
