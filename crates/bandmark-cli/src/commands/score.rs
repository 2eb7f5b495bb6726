//! The `bandmark score` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use bandmark_core::feedback::feedback_for_band;
use bandmark_core::parser;
use bandmark_core::scoring::score_submission;

pub fn execute(
    test_path: PathBuf,
    submission_path: PathBuf,
    json_path: Option<PathBuf>,
) -> Result<()> {
    let test = parser::parse_practice_test(&test_path)?;
    let submission = parser::parse_submission(&submission_path)?;

    anyhow::ensure!(
        test.skill.is_scorable(),
        "'{}' is a {} test and has no answer key to mark against",
        test.id,
        test.skill
    );
    if submission.test_id != test.id {
        anyhow::bail!(
            "submission is for test '{}' but the test file defines '{}'",
            submission.test_id,
            test.id
        );
    }

    let key = test.answer_key();
    let scored = score_submission(&submission.answers, &key);

    let mut table = Table::new();
    table.set_header(vec!["Test", "Questions", "Raw score", "Band", "Feedback"]);
    table.add_row(vec![
        Cell::new(&test.name),
        Cell::new(key.answers.len()),
        Cell::new(scored.raw_score),
        Cell::new(scored.band),
        Cell::new(feedback_for_band(scored.band)),
    ]);
    println!("{table}");

    if let Some(path) = json_path {
        let json = serde_json::to_string_pretty(&scored)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, json)?;
        eprintln!("Scored result saved to: {}", path.display());
    }

    Ok(())
}
