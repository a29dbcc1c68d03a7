//! Sentence database operations
//!
//! Every read goes through [`SENTENCE_SELECT`], which joins the owning
//! category so soft-deleted categories can be filtered out.

use chrono::{DateTime, Utc};
use esl_common::db::{CategorySummary, Difficulty, Sentence};
use esl_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::pagination::PAGE_SIZE;

/// Sentence columns joined with their category
pub const SENTENCE_SELECT: &str = "SELECT s.guid, s.english_text, s.chinese_text, s.difficulty, \
     s.audio_url, s.is_shared, s.user_id, s.created_at, s.updated_at, \
     c.guid AS category_guid, c.name AS category_name, c.color AS category_color \
     FROM sentences s JOIN categories c ON c.guid = s.category_id";

/// Fields for a new sentence
#[derive(Debug, Clone)]
pub struct NewSentence {
    pub english_text: String,
    pub chinese_text: String,
    pub difficulty: Difficulty,
    pub audio_url: Option<String>,
    pub is_shared: bool,
    pub category_id: Uuid,
}

/// Partial update; `None` leaves a field unchanged
///
/// `audio_url: Some(None)` clears the audio reference.
#[derive(Debug, Clone, Default)]
pub struct SentenceChanges {
    pub english_text: Option<String>,
    pub chinese_text: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub audio_url: Option<Option<String>>,
    pub is_shared: Option<bool>,
    pub category_id: Option<Uuid>,
}

/// Filters for the sentence browser
#[derive(Debug, Clone, Default)]
pub struct SentenceFilter {
    pub category_id: Option<Uuid>,
    pub difficulty: Option<Difficulty>,
    /// Substring matched against English and Chinese text
    pub search: Option<String>,
}

/// Parse a stored guid column
pub fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid stored id '{}': {}", value, e)))
}

/// Map a row produced by [`SENTENCE_SELECT`]
pub fn sentence_from_row(row: &SqliteRow) -> Result<Sentence> {
    let difficulty: String = row.try_get("difficulty")?;

    Ok(Sentence {
        id: parse_guid(&row.try_get::<String, _>("guid")?)?,
        english_text: row.try_get("english_text")?,
        chinese_text: row.try_get("chinese_text")?,
        difficulty: difficulty
            .parse()
            .map_err(|_| Error::Internal(format!("Invalid stored difficulty '{}'", difficulty)))?,
        audio_url: row.try_get("audio_url")?,
        is_shared: row.try_get("is_shared")?,
        user_id: row.try_get("user_id")?,
        category: CategorySummary {
            id: parse_guid(&row.try_get::<String, _>("category_guid")?)?,
            name: row.try_get("category_name")?,
            color: row.try_get("category_color")?,
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

/// Append the visibility clause: shared or owned, category not deleted
pub fn push_visibility<'a>(qb: &mut QueryBuilder<'a, Sqlite>, user_id: &'a str) {
    qb.push(" WHERE (s.is_shared = 1 OR s.user_id = ")
        .push_bind(user_id)
        .push(") AND c.deleted_at IS NULL");
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a SentenceFilter) {
    if let Some(category_id) = filter.category_id {
        qb.push(" AND s.category_id = ").push_bind(category_id.to_string());
    }
    if let Some(difficulty) = filter.difficulty {
        qb.push(" AND s.difficulty = ").push_bind(difficulty.as_str());
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (s.english_text LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR s.chinese_text LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Escape LIKE wildcards so user input matches literally (`ESCAPE '\'`)
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fetch a sentence if `user_id` may read it
pub async fn get_visible_sentence(
    pool: &SqlitePool,
    user_id: &str,
    id: Uuid,
) -> Result<Option<Sentence>> {
    let id = id.to_string();
    let mut qb = QueryBuilder::<Sqlite>::new(SENTENCE_SELECT);
    push_visibility(&mut qb, user_id);
    qb.push(" AND s.guid = ").push_bind(id.as_str());

    let row = qb.build().fetch_optional(pool).await?;
    row.as_ref().map(sentence_from_row).transpose()
}

/// Fetch a visible sentence that `user_id` owns
///
/// Fails with `NotFound` if invisible, `Forbidden` if visible but shared by
/// someone else.
pub async fn get_owned_sentence(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<Sentence> {
    let sentence = get_visible_sentence(pool, user_id, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("sentence {}", id)))?;

    if sentence.user_id != user_id {
        return Err(Error::Forbidden(format!("sentence {} belongs to another user", id)));
    }

    Ok(sentence)
}

/// Count sentences visible to `user_id` matching `filter`
pub async fn count_visible_sentences(
    pool: &SqlitePool,
    user_id: &str,
    filter: &SentenceFilter,
) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM sentences s JOIN categories c ON c.guid = s.category_id",
    );
    push_visibility(&mut qb, user_id);
    push_filter(&mut qb, filter);

    let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// One page of visible sentences, newest first
pub async fn list_visible_sentences(
    pool: &SqlitePool,
    user_id: &str,
    filter: &SentenceFilter,
    offset: i64,
) -> Result<Vec<Sentence>> {
    let mut qb = QueryBuilder::<Sqlite>::new(SENTENCE_SELECT);
    push_visibility(&mut qb, user_id);
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY s.created_at DESC, s.guid ASC LIMIT ")
        .push_bind(PAGE_SIZE)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(sentence_from_row).collect()
}

/// Insert a sentence owned by `user_id`
pub async fn insert_sentence(pool: &SqlitePool, user_id: &str, new: &NewSentence) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = esl_common::time::now();

    sqlx::query(
        r#"
        INSERT INTO sentences (
            guid, english_text, chinese_text, difficulty, audio_url,
            is_shared, user_id, category_id, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&new.english_text)
    .bind(&new.chinese_text)
    .bind(new.difficulty.as_str())
    .bind(&new.audio_url)
    .bind(new.is_shared)
    .bind(user_id)
    .bind(new.category_id.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Apply `changes` to an existing sentence
pub async fn update_sentence(
    pool: &SqlitePool,
    existing: &Sentence,
    changes: SentenceChanges,
) -> Result<()> {
    let english_text = changes.english_text.unwrap_or_else(|| existing.english_text.clone());
    let chinese_text = changes.chinese_text.unwrap_or_else(|| existing.chinese_text.clone());
    let difficulty = changes.difficulty.unwrap_or(existing.difficulty);
    let audio_url = changes.audio_url.unwrap_or_else(|| existing.audio_url.clone());
    let is_shared = changes.is_shared.unwrap_or(existing.is_shared);
    let category_id = changes.category_id.unwrap_or(existing.category.id);

    sqlx::query(
        r#"
        UPDATE sentences SET
            english_text = ?, chinese_text = ?, difficulty = ?, audio_url = ?,
            is_shared = ?, category_id = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(english_text)
    .bind(chinese_text)
    .bind(difficulty.as_str())
    .bind(audio_url)
    .bind(is_shared)
    .bind(category_id.to_string())
    .bind(esl_common::time::now())
    .bind(existing.id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Hard delete; favorites cascade
pub async fn delete_sentence(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM sentences WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}
