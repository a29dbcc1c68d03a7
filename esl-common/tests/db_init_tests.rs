//! Unit tests for database initialization
//!
//! Tests cover:
//! - Automatic database creation on first run
//! - Reopening an existing database
//! - Expected tables and cascade behavior

use esl_common::db::init::{init_database, SCHEMA_VERSION};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("esl.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("esl.db");

    let pool1 = init_database(&db_path).await.expect("First open");
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_expected_tables_exist() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("esl.db")).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in ["categories", "favorites", "practice_logs", "schema_version", "sentences"] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_sentence_delete_cascades_to_favorites() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("esl.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO categories (guid, name, color, user_id, created_at) VALUES ('c1', 'Daily', '#fff', 'u1', CURRENT_TIMESTAMP)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO sentences (guid, english_text, chinese_text, difficulty, user_id, category_id, created_at, updated_at)
         VALUES ('s1', 'Hi', '你好', 'easy', 'u1', 'c1', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO favorites (user_id, sentence_id, created_at) VALUES ('u1', 's1', CURRENT_TIMESTAMP)")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM sentences WHERE guid = 's1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_difficulty_check_constraint() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("esl.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO categories (guid, name, color, user_id, created_at) VALUES ('c1', 'Daily', '#fff', 'u1', CURRENT_TIMESTAMP)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = sqlx::query(
        "INSERT INTO sentences (guid, english_text, chinese_text, difficulty, user_id, category_id, created_at, updated_at)
         VALUES ('s1', 'Hi', '你好', 'extreme', 'u1', 'c1', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Unknown difficulty should violate CHECK constraint");
}
