//! Category database operations
//!
//! Categories are never removed; deleting one stamps `deleted_at`, which
//! hides it and its sentences from every read path.

use chrono::{DateTime, Utc};
use esl_common::db::Category;
use esl_common::{Error, Result};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::sentences::parse_guid;

/// Category with the number of sentences filed under it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub sentence_count: i64,
}

fn category_from_row(row: &SqliteRow) -> Result<Category> {
    Ok(Category {
        id: parse_guid(&row.try_get::<String, _>("guid")?)?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        deleted_at: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?,
    })
}

/// Non-deleted categories owned by `user_id`, oldest first
pub async fn list_categories(pool: &SqlitePool, user_id: &str) -> Result<Vec<CategoryWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT c.guid, c.name, c.color, c.user_id, c.created_at, c.deleted_at,
               COUNT(s.guid) AS sentence_count
        FROM categories c
        LEFT JOIN sentences s ON s.category_id = c.guid
        WHERE c.user_id = ? AND c.deleted_at IS NULL
        GROUP BY c.guid
        ORDER BY c.created_at ASC, c.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<CategoryWithCount> {
            Ok(CategoryWithCount {
                category: category_from_row(row)?,
                sentence_count: row.try_get("sentence_count")?,
            })
        })
        .collect()
}

/// Fetch a category unless it is soft-deleted
pub async fn get_active_category(pool: &SqlitePool, id: Uuid) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT guid, name, color, user_id, created_at, deleted_at
         FROM categories WHERE guid = ? AND deleted_at IS NULL",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(category_from_row).transpose()
}

/// Fetch an active category owned by `user_id`
pub async fn get_owned_category(pool: &SqlitePool, user_id: &str, id: Uuid) -> Result<Category> {
    let category = get_active_category(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category {}", id)))?;

    if category.user_id != user_id {
        return Err(Error::Forbidden(format!("category {} belongs to another user", id)));
    }

    Ok(category)
}

/// Insert a category owned by `user_id`
pub async fn insert_category(
    pool: &SqlitePool,
    user_id: &str,
    name: &str,
    color: &str,
) -> Result<Category> {
    let category = Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        color: color.to_string(),
        user_id: user_id.to_string(),
        created_at: esl_common::time::now(),
        deleted_at: None,
    };

    sqlx::query(
        "INSERT INTO categories (guid, name, color, user_id, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(category.id.to_string())
    .bind(&category.name)
    .bind(&category.color)
    .bind(&category.user_id)
    .bind(category.created_at)
    .execute(pool)
    .await?;

    Ok(category)
}

/// Stamp `deleted_at`; already-deleted categories are left untouched
pub async fn soft_delete_category(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE categories SET deleted_at = ? WHERE guid = ? AND deleted_at IS NULL")
        .bind(esl_common::time::now())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}
