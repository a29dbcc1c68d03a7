//! Practice log database operations
//!
//! Practice logs are append-only: there is no update or delete path.

use esl_common::db::PracticeLog;
use esl_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::sentences::parse_guid;

/// Record one practice event
pub async fn append_practice_log(
    pool: &SqlitePool,
    user_id: &str,
    sentence_id: Uuid,
) -> Result<PracticeLog> {
    let log = PracticeLog {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        sentence_id,
        created_at: esl_common::time::now(),
    };

    sqlx::query(
        "INSERT INTO practice_logs (guid, user_id, sentence_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(log.id.to_string())
    .bind(&log.user_id)
    .bind(log.sentence_id.to_string())
    .bind(log.created_at)
    .execute(pool)
    .await?;

    Ok(log)
}

/// Number of practice events per sentence for `user_id`
pub async fn practice_counts(pool: &SqlitePool, user_id: &str) -> Result<HashMap<Uuid, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT sentence_id, COUNT(*) FROM practice_logs WHERE user_id = ? GROUP BY sentence_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(sentence_id, count)| -> Result<(Uuid, i64)> {
            Ok((parse_guid(&sentence_id)?, count))
        })
        .collect()
}
