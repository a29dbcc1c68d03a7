//! Recommendation selection against a real SQLite database

mod helpers;

use std::collections::HashSet;

use esl_common::config::RecommendationConfig;
use esl_server::db::practice_logs::append_practice_log;
use esl_server::db::SqliteSentenceRepository;
use esl_server::services::select_candidates;
use helpers::{TestApp, ALICE, BOB};
use uuid::Uuid;

async fn recommend(app: &TestApp, user: &str) -> Vec<esl_common::db::Sentence> {
    let repo = SqliteSentenceRepository::new(app.pool.clone());
    select_candidates(&repo, user, &RecommendationConfig::default())
        .await
        .expect("Selection should succeed")
}

async fn practice(app: &TestApp, user: &str, id: Uuid, times: usize) {
    for _ in 0..times {
        append_practice_log(&app.pool, user, id).await.unwrap();
    }
}

#[tokio::test]
async fn test_batch_capped_and_eligible() {
    let app = TestApp::new().await;
    let mine = app.category(ALICE, "Mine").await;
    let theirs = app.category(BOB, "Theirs").await;

    let mut eligible = HashSet::new();
    for i in 0..15 {
        eligible.insert(app.sentence(ALICE, mine, &format!("mine {}", i), false, true).await);
    }
    for i in 0..5 {
        eligible.insert(app.sentence(BOB, theirs, &format!("shared {}", i), true, true).await);
    }
    for i in 0..5 {
        app.sentence(BOB, theirs, &format!("private {}", i), false, true).await;
        app.sentence(ALICE, mine, &format!("silent {}", i), false, false).await;
    }

    for _ in 0..5 {
        let batch = recommend(&app, ALICE).await;
        assert_eq!(batch.len(), 10);

        let ids: HashSet<Uuid> = batch.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), batch.len(), "no duplicates");
        assert!(ids.is_subset(&eligible));
        assert!(batch.iter().all(|s| s.audio_url.is_some()));
    }
}

#[tokio::test]
async fn test_empty_library_is_not_an_error() {
    let app = TestApp::new().await;

    assert!(recommend(&app, ALICE).await.is_empty());
}

#[tokio::test]
async fn test_deleted_category_excluded() {
    let app = TestApp::new().await;
    let live = app.category(ALICE, "Live").await;
    let dead = app.category(ALICE, "Dead").await;
    let kept = app.sentence(ALICE, live, "kept", false, true).await;
    app.sentence(ALICE, dead, "hidden", false, true).await;

    esl_server::db::categories::soft_delete_category(&app.pool, dead)
        .await
        .unwrap();

    let batch = recommend(&app, ALICE).await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, kept);
}

#[tokio::test]
async fn test_reinforcement_sentences_resurface() {
    let app = TestApp::new().await;
    let category = app.category(ALICE, "Daily").await;

    let mut fresh = HashSet::new();
    for i in 0..20 {
        fresh.insert(app.sentence(ALICE, category, &format!("fresh {}", i), false, true).await);
    }
    let review = app.sentence(ALICE, category, "review", false, true).await;
    practice(&app, ALICE, review, 2).await;

    let batch = recommend(&app, ALICE).await;
    let ids: HashSet<Uuid> = batch.iter().map(|s| s.id).collect();

    assert_eq!(batch.len(), 10);
    assert!(ids.contains(&review));
}

#[tokio::test]
async fn test_heavily_practiced_fill_short_pool() {
    let app = TestApp::new().await;
    let category = app.category(ALICE, "Daily").await;

    let mut all = HashSet::new();
    for i in 0..4 {
        let id = app.sentence(ALICE, category, &format!("drilled {}", i), false, true).await;
        practice(&app, ALICE, id, 5).await;
        all.insert(id);
    }

    let batch = recommend(&app, ALICE).await;
    let ids: HashSet<Uuid> = batch.iter().map(|s| s.id).collect();
    assert_eq!(ids, all);
}

#[tokio::test]
async fn test_history_is_per_user() {
    let app = TestApp::new().await;
    let category = app.category(BOB, "Shared").await;
    let id = app.sentence(BOB, category, "shared", true, true).await;
    practice(&app, BOB, id, 10).await;

    let batch = recommend(&app, ALICE).await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, id);
}

#[tokio::test]
async fn test_history_larger_than_sqlite_variable_limit() {
    let app = TestApp::new().await;
    let category = app.category(ALICE, "Daily").await;
    let fresh = app.sentence(ALICE, category, "never practiced", false, true).await;
    let review = app.sentence(ALICE, category, "practiced once", false, true).await;
    practice(&app, ALICE, review, 1).await;

    // 40,000 single-practice rows for sentences that no longer exist
    sqlx::query(
        r#"
        WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 40000)
        INSERT INTO practice_logs (guid, user_id, sentence_id, created_at)
        SELECT printf('%08x-0000-4000-8000-%012x', i, i),
               ?,
               printf('%08x-0000-4000-9000-%012x', i, i),
               ?
        FROM n
        "#,
    )
    .bind(ALICE)
    .bind(esl_common::time::now())
    .execute(&app.pool)
    .await
    .unwrap();

    let batch = recommend(&app, ALICE).await;
    let ids: HashSet<Uuid> = batch.iter().map(|s| s.id).collect();

    assert_eq!(ids, HashSet::from([fresh, review]));
}
