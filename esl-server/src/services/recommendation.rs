//! Practice candidate selection
//!
//! Builds a practice batch biased toward sentences the user has never
//! practiced, while resurfacing a few sentences in the reinforcement window
//! (practiced 1 to 3 times by default):
//!
//! 1. Count practice events per sentence for the user
//! 2. Fresh phase: up to `fresh_quota` eligible, never-practiced sentences
//! 3. Reinforcement phase: up to `reinforce_quota` eligible sentences whose
//!    count falls in the reinforcement window (skipped if there are none)
//! 4. Merge, deduplicating by id
//! 5. Top up from any eligible sentence not yet chosen, up to `batch_size`
//! 6. Shuffle and truncate to `batch_size`
//!
//! Every repository sample is randomly ordered, and the final shuffle means
//! a phase only biases membership, never position.

use std::collections::HashSet;

use esl_common::config::RecommendationConfig;
use esl_common::db::Sentence;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::repository::{EligibleQuery, SentenceRepository};

/// Selection failure; the cause is kept for logging only
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("failed to fetch recommendation")]
    Fetch(#[source] esl_common::Error),
}

/// Select up to `config.batch_size` practice sentences for `user_id`
///
/// Any repository failure aborts the whole selection; there is no partial
/// result and no retry. Running out of eligible sentences is not an error:
/// the batch is simply shorter (possibly empty).
pub async fn select_candidates<R>(
    repo: &R,
    user_id: &str,
    config: &RecommendationConfig,
) -> Result<Vec<Sentence>, RecommendationError>
where
    R: SentenceRepository + ?Sized,
{
    let counts = repo
        .practice_counts(user_id)
        .await
        .map_err(RecommendationError::Fetch)?;

    let practiced = counts.values().filter(|&&count| count >= 1).count();
    let reinforce_due = counts
        .values()
        .filter(|&&count| config.is_reinforcement(count))
        .count();

    let fresh = repo
        .find_eligible_sentences(user_id, &EligibleQuery::unpracticed(config.fresh_quota))
        .await
        .map_err(RecommendationError::Fetch)?;

    let review = if reinforce_due == 0 {
        Vec::new()
    } else {
        repo.find_eligible_sentences(
            user_id,
            &EligibleQuery::practiced_between(
                config.reinforce_min_count,
                config.reinforce_max_count,
                config.reinforce_quota,
            ),
        )
        .await
        .map_err(RecommendationError::Fetch)?
    };

    debug!(
        user_id,
        practiced,
        reinforce_due,
        fresh = fresh.len(),
        review = review.len(),
        "Recommendation phases sampled"
    );

    let mut batch = Batch::new(user_id, config.batch_size);
    batch.extend(fresh);
    batch.extend(review);

    let missing = config.batch_size.saturating_sub(batch.len());
    if missing > 0 {
        let supplement = repo
            .find_eligible_sentences(
                user_id,
                &EligibleQuery::excluding(batch.chosen_ids(), missing),
            )
            .await
            .map_err(RecommendationError::Fetch)?;
        debug!(user_id, supplement = supplement.len(), "Recommendation topped up");
        batch.extend(supplement);
    }

    Ok(batch.finish())
}

/// Deduplicating accumulator for one recommendation batch
struct Batch<'a> {
    user_id: &'a str,
    limit: usize,
    seen: HashSet<Uuid>,
    sentences: Vec<Sentence>,
}

impl<'a> Batch<'a> {
    fn new(user_id: &'a str, limit: usize) -> Self {
        Self {
            user_id,
            limit,
            seen: HashSet::new(),
            sentences: Vec::with_capacity(limit),
        }
    }

    fn len(&self) -> usize {
        self.sentences.len()
    }

    fn extend(&mut self, sentences: Vec<Sentence>) {
        for sentence in sentences {
            // Repositories filter eligibility; re-check the parts we can see
            if !sentence.is_visible_to(self.user_id) || sentence.audio_url.is_none() {
                continue;
            }
            if self.seen.insert(sentence.id) {
                self.sentences.push(sentence);
            }
        }
    }

    fn chosen_ids(&self) -> Vec<Uuid> {
        self.sentences.iter().map(|s| s.id).collect()
    }

    fn finish(mut self) -> Vec<Sentence> {
        self.sentences.shuffle(&mut rand::thread_rng());
        self.sentences.truncate(self.limit);
        self.sentences
    }
}
