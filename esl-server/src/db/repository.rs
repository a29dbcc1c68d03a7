//! Repository seam for the practice recommendation selector
//!
//! The selector only needs two reads: the caller's practice counts and a
//! random sample of eligible sentences. Keeping them behind a trait lets the
//! selection logic run against an in-memory fake in tests.

use async_trait::async_trait;
use esl_common::db::Sentence;
use esl_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use super::practice_logs;
use super::sentences::{push_visibility, sentence_from_row, SENTENCE_SELECT};

/// Constraint applied to an eligible-sentence sample
///
/// History-based filters are resolved inside the query, so their cost does
/// not grow with the number of bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdFilter {
    /// Any eligible sentence
    Any,
    /// Sentences the user has never practiced
    Unpracticed,
    /// Sentences the user has practiced between `min` and `max` times
    PracticedBetween { min: i64, max: i64 },
    /// Every eligible sentence except these ids (a batch's worth at most)
    Excluding(Vec<Uuid>),
}

/// Random sample request over eligible sentences
///
/// Eligible means: visible to the user (shared or owned), has an audio URL,
/// and belongs to a category that is not soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleQuery {
    pub ids: IdFilter,
    /// Maximum number of sentences to return
    pub limit: usize,
}

impl EligibleQuery {
    pub fn unpracticed(limit: usize) -> Self {
        Self {
            ids: IdFilter::Unpracticed,
            limit,
        }
    }

    pub fn practiced_between(min: i64, max: i64, limit: usize) -> Self {
        Self {
            ids: IdFilter::PracticedBetween { min, max },
            limit,
        }
    }

    pub fn excluding(ids: Vec<Uuid>, limit: usize) -> Self {
        let ids = if ids.is_empty() {
            IdFilter::Any
        } else {
            IdFilter::Excluding(ids)
        };
        Self { ids, limit }
    }
}

/// Reads needed by the recommendation selector
#[async_trait]
pub trait SentenceRepository: Send + Sync {
    /// Practice event count per sentence for `user_id`
    async fn practice_counts(&self, user_id: &str) -> Result<HashMap<Uuid, i64>>;

    /// Up to `query.limit` eligible sentences in random order
    async fn find_eligible_sentences(
        &self,
        user_id: &str,
        query: &EligibleQuery,
    ) -> Result<Vec<Sentence>>;
}

/// SQLite-backed repository
#[derive(Clone)]
pub struct SqliteSentenceRepository {
    pool: SqlitePool,
}

impl SqliteSentenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SentenceRepository for SqliteSentenceRepository {
    async fn practice_counts(&self, user_id: &str) -> Result<HashMap<Uuid, i64>> {
        practice_logs::practice_counts(&self.pool, user_id).await
    }

    async fn find_eligible_sentences(
        &self,
        user_id: &str,
        query: &EligibleQuery,
    ) -> Result<Vec<Sentence>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(SENTENCE_SELECT);
        push_visibility(&mut qb, user_id);
        qb.push(" AND s.audio_url IS NOT NULL");

        match &query.ids {
            IdFilter::Any => {}
            IdFilter::Unpracticed => {
                qb.push(" AND s.guid NOT IN (SELECT sentence_id FROM practice_logs WHERE user_id = ")
                    .push_bind(user_id)
                    .push(")");
            }
            IdFilter::PracticedBetween { min, max } => {
                qb.push(" AND s.guid IN (SELECT sentence_id FROM practice_logs WHERE user_id = ")
                    .push_bind(user_id)
                    .push(" GROUP BY sentence_id HAVING COUNT(*) BETWEEN ")
                    .push_bind(*min)
                    .push(" AND ")
                    .push_bind(*max)
                    .push(")");
            }
            IdFilter::Excluding(ids) => {
                qb.push(" AND s.guid NOT IN (");
                let mut separated = qb.separated(", ");
                for id in ids {
                    separated.push_bind(id.to_string());
                }
                separated.push_unseparated(")");
            }
        }

        qb.push(" ORDER BY RANDOM() LIMIT ").push_bind(query.limit as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(sentence_from_row).collect()
    }
}
