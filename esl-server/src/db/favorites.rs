//! Favorite database operations

use esl_common::db::Sentence;
use esl_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::sentences::{push_visibility, sentence_from_row, SENTENCE_SELECT};

/// Mark a sentence as favorite; repeated calls are no-ops
pub async fn add_favorite(pool: &SqlitePool, user_id: &str, sentence_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO favorites (user_id, sentence_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(sentence_id.to_string())
    .bind(esl_common::time::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove a favorite; returns false if it did not exist
pub async fn remove_favorite(pool: &SqlitePool, user_id: &str, sentence_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND sentence_id = ?")
        .bind(user_id)
        .bind(sentence_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Favorite sentences still visible to `user_id`, most recent favorite first
pub async fn list_favorites(pool: &SqlitePool, user_id: &str) -> Result<Vec<Sentence>> {
    let mut qb = QueryBuilder::<Sqlite>::new(SENTENCE_SELECT);
    qb.push(" JOIN favorites f ON f.sentence_id = s.guid AND f.user_id = ")
        .push_bind(user_id);
    push_visibility(&mut qb, user_id);
    qb.push(" ORDER BY f.created_at DESC");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(sentence_from_row).collect()
}
