//! The `bandmark submit` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use bandmark_core::engine::{ProgressReporter, SubmitEngine, SubmitEngineConfig};
use bandmark_core::feedback::feedback_for_band;
use bandmark_core::model::SubmissionOutcome;
use bandmark_core::parser;
use bandmark_store::config::load_config_from;
use bandmark_store::create_store;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submit_start(&self, learner_id: &str, test_id: &str) {
        eprintln!("  Submitting: {learner_id} :: {test_id}");
    }

    fn on_submit_complete(&self, learner_id: &str, test_id: &str, outcome: &SubmissionOutcome) {
        let saved = if outcome.persisted() {
            "saved"
        } else {
            "NOT SAVED"
        };
        eprintln!(
            "  Done: {learner_id} :: {test_id} raw {} band {} [{saved}]",
            outcome.raw_score, outcome.band,
        );
    }

    fn on_submit_failed(&self, learner_id: &str, test_id: &str, error: &str) {
        eprintln!("  ERROR: {learner_id} :: {test_id}: {error}");
    }
}

pub async fn execute(
    submission_path: PathBuf,
    test_file: Option<PathBuf>,
    parallelism: usize,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config.store)?;
    let engine = SubmitEngine::new(Arc::clone(&store), SubmitEngineConfig { parallelism });

    if submission_path.is_dir() {
        anyhow::ensure!(
            test_file.is_none(),
            "--test-file only applies to a single submission file"
        );

        let submissions = parser::load_submission_directory(&submission_path)?;
        anyhow::ensure!(
            !submissions.is_empty(),
            "no submissions found in {}",
            submission_path.display()
        );
        eprintln!("Submitting {} attempts", submissions.len());

        let report = engine.submit_batch(&submissions, &ConsoleReporter).await;
        let not_saved = report.outcomes.iter().filter(|o| !o.persisted()).count();

        eprintln!(
            "\nComplete: {} scored, {} failed ({:.1}s)",
            report.outcomes.len(),
            report.failed,
            report.duration.as_secs_f64()
        );
        if not_saved > 0 {
            eprintln!("Warning: {not_saved} attempt(s) were scored but not durably saved.");
        }
        return Ok(());
    }

    let submission = parser::parse_submission(&submission_path)?;

    // A local test file sidesteps the store's answer key, e.g. while authoring.
    let outcome = match &test_file {
        Some(path) => {
            let test = parser::parse_practice_test(path)?;
            anyhow::ensure!(
                test.skill.is_scorable(),
                "'{}' is a {} test and has no answer key to mark against",
                test.id,
                test.skill
            );
            anyhow::ensure!(
                test.id == submission.test_id,
                "submission is for test '{}' but the test file defines '{}'",
                submission.test_id,
                test.id
            );
            engine.submit_with_key(&submission, &test.answer_key()).await
        }
        None => engine.submit(&submission).await?,
    };

    println!(
        "{} scored raw {} on {}: band {}",
        submission.learner_id, outcome.raw_score, submission.test_id, outcome.band
    );
    println!("{}", feedback_for_band(outcome.band));

    // The score is still shown on a persistence failure; the attempt just
    // was not recorded.
    if let Some(error) = &outcome.error {
        eprintln!("Warning: attempt was not saved: {error}");
    }

    Ok(())
}
