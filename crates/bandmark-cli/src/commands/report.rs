//! The `bandmark report` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use uuid::Uuid;

use bandmark_core::model::AttemptRecord;
use bandmark_core::report::ProgressReport;
use bandmark_core::statistics::compute_aggregate_stats;
use bandmark_core::traits::AttemptStore;
use bandmark_report::html::write_html_report;
use bandmark_report::markdown::write_markdown_report;
use bandmark_store::config::load_config_from;
use bandmark_store::create_store;

pub async fn execute(
    input: Option<PathBuf>,
    learner: Option<String>,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut attempts: Vec<AttemptRecord> = match &input {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read attempts from {}", path.display()))?;
            serde_json::from_str(&content).context("failed to parse attempts JSON")?
        }
        None => {
            let config = load_config_from(config_path.as_deref())?;
            let store = create_store(&config.store)?;
            store.fetch_attempts(learner.as_deref()).await?
        }
    };

    // Input files are unfiltered exports; apply the learner filter here too.
    if let Some(learner) = &learner {
        attempts.retain(|a| &a.learner_id == learner);
    }

    anyhow::ensure!(!attempts.is_empty(), "no attempts to report on");

    let aggregate = compute_aggregate_stats(&attempts);
    let report = ProgressReport {
        id: Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        attempts,
        aggregate,
    };

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown", "html"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output.join(format!("report-{timestamp}.md"));
                write_markdown_report(&report, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(report: &ProgressReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Learner",
        "Attempts",
        "Best band",
        "Latest band",
        "Streak",
    ]);

    let mut learners: Vec<_> = report.aggregate.per_learner.values().collect();
    learners.sort_by(|a, b| a.learner_id.cmp(&b.learner_id));
    for stats in learners {
        table.add_row(vec![
            Cell::new(&stats.learner_id),
            Cell::new(stats.attempts),
            Cell::new(stats.best_band),
            Cell::new(stats.latest_band),
            Cell::new(format!("{} day(s)", stats.streak_days)),
        ]);
    }

    eprintln!("\n{table}");
}
