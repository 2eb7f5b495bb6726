//! End-to-end pipeline tests: score, persist, aggregate.
//!
//! These run the whole submit pipeline in-process against the in-memory
//! store, including the persistence-failure path.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use bandmark_core::engine::{NoopReporter, SubmitEngine, SubmitEngineConfig};
use bandmark_core::model::{AnswerKey, Submission};
use bandmark_core::parser::parse_practice_test_str;
use bandmark_core::report::ProgressReport;
use bandmark_core::statistics::compute_aggregate_stats;
use bandmark_core::traits::AttemptStore;
use bandmark_store::MemoryStore;

fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(id, a)| (id.to_string(), a.to_string()))
        .collect()
}

fn reading_key() -> AnswerKey {
    AnswerKey {
        test_id: "academic-reading-1".into(),
        answers: answers(&[
            ("q1", "true"),
            ("q2", "false"),
            ("q3", "not given"),
            ("q4", "mania"),
        ]),
    }
}

fn submission(learner: &str, pairs: &[(&str, &str)]) -> Submission {
    Submission {
        learner_id: learner.into(),
        test_id: "academic-reading-1".into(),
        answers: answers(pairs),
    }
}

#[tokio::test]
async fn e2e_submit_persists_record() {
    let store = Arc::new(MemoryStore::new().with_answer_key(reading_key()));
    let engine = SubmitEngine::new(store.clone(), SubmitEngineConfig::default());

    let sub = submission(
        "learner-1",
        &[("q1", " TRUE "), ("q2", "false"), ("q3", "given"), ("q4", "Mania")],
    );
    let outcome = engine.submit(&sub).await.unwrap();

    assert_eq!(outcome.raw_score, 3);
    assert!(outcome.persisted());

    let stored = store.attempts();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, outcome.attempt_id);
    assert_eq!(stored[0].raw_score, 3);
    assert_eq!(stored[0].band, outcome.band);
    // The answers snapshot keeps the submitted text verbatim.
    assert_eq!(stored[0].answers["q1"], " TRUE ");
}

#[tokio::test]
async fn e2e_insert_failure_keeps_score() {
    let store = Arc::new(MemoryStore::new().with_answer_key(reading_key()));
    store.fail_inserts(true);
    let engine = SubmitEngine::new(store.clone(), SubmitEngineConfig::default());

    let sub = submission("learner-1", &[("q1", "true"), ("q2", "false")]);
    let outcome = engine.submit(&sub).await.unwrap();

    // The score is computed in-process and survives the failed insert.
    assert_eq!(outcome.raw_score, 2);
    assert_eq!(outcome.band.to_string(), "2.0");
    assert!(outcome.error.is_some());
    assert_eq!(store.insert_count(), 1);
    assert!(store.attempts().is_empty());
}

#[tokio::test]
async fn e2e_batch_then_report() {
    let store = Arc::new(MemoryStore::new().with_answer_key(reading_key()));
    let engine = SubmitEngine::new(store.clone(), SubmitEngineConfig { parallelism: 2 });

    let batch = vec![
        submission("amy", &[("q1", "true"), ("q2", "false"), ("q3", "not given")]),
        submission("amy", &[("q1", "true"), ("q2", "true")]),
        submission("ben", &[("q1", "false")]),
    ];

    let submit_report = engine.submit_batch(&batch, &NoopReporter).await;
    assert_eq!(submit_report.outcomes.len(), 3);
    assert_eq!(submit_report.failed, 0);

    let attempts = store.fetch_attempts(None).await.unwrap();
    assert_eq!(attempts.len(), 3);

    let aggregate = compute_aggregate_stats(&attempts);
    assert_eq!(aggregate.per_learner["amy"].attempts, 2);
    assert_eq!(aggregate.per_learner["ben"].attempts, 1);
    assert_eq!(aggregate.per_test["academic-reading-1"].attempts, 3);

    // The report survives a JSON roundtrip.
    let report = ProgressReport {
        id: uuid::Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        attempts,
        aggregate,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_json(&path).unwrap();
    let loaded = ProgressReport::load_json(&path).unwrap();
    assert_eq!(loaded.attempts.len(), 3);
}

#[tokio::test]
async fn e2e_parsed_test_through_pipeline() {
    let toml = r#"
[test]
id = "mini"
name = "Mini Reading"
skill = "reading"

[[questions]]
id = "q1"
prompt = "First statement."
answer = "true"

[[questions]]
id = "q2"
prompt = "Second statement."
answer = "false"
"#;
    let test = parse_practice_test_str(toml, &PathBuf::from("mini.toml")).unwrap();
    let store = Arc::new(MemoryStore::new().with_answer_key(test.answer_key()));
    let engine = SubmitEngine::new(store.clone(), SubmitEngineConfig::default());

    let sub = Submission {
        learner_id: "learner-1".into(),
        test_id: "mini".into(),
        answers: answers(&[("q1", "True"), ("q2", "false")]),
    };

    let outcome = engine.submit(&sub).await.unwrap();
    assert_eq!(outcome.raw_score, 2);
    assert_eq!(outcome.band.to_string(), "2.0");
    assert_eq!(store.attempts().len(), 1);
}

#[tokio::test]
async fn e2e_unknown_test_is_an_error() {
    let store = Arc::new(MemoryStore::new());
    let engine = SubmitEngine::new(store, SubmitEngineConfig::default());

    let sub = submission("learner-1", &[("q1", "true")]);
    let err = engine.submit(&sub).await.unwrap_err();
    assert!(err.to_string().contains("test not found"));
}
