//! Markdown report generator.

use std::path::Path;

use anyhow::Result;

use bandmark_core::report::ProgressReport;

/// Generate a markdown progress summary.
pub fn generate_markdown(report: &ProgressReport) -> String {
    let mut md = String::new();

    md.push_str("# bandmark progress report\n\n");
    md.push_str(&format!(
        "Created {} | {} attempts | {} learners | {} tests\n\n",
        report.created_at.format("%Y-%m-%d %H:%M UTC"),
        report.attempts.len(),
        report.aggregate.per_learner.len(),
        report.aggregate.per_test.len()
    ));

    if !report.aggregate.per_learner.is_empty() {
        md.push_str("## Learners\n\n");
        md.push_str("| Learner | Attempts | Best band | Latest band | Avg raw | Streak |\n");
        md.push_str("|---------|----------|-----------|-------------|---------|--------|\n");

        let mut learners: Vec<_> = report.aggregate.per_learner.values().collect();
        learners.sort_by(|a, b| a.learner_id.cmp(&b.learner_id));
        for stats in learners {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:.1} | {} day(s) |\n",
                stats.learner_id,
                stats.attempts,
                stats.best_band,
                stats.latest_band,
                stats.avg_raw_score,
                stats.streak_days
            ));
        }
        md.push('\n');
    }

    if !report.aggregate.per_test.is_empty() {
        md.push_str("## Tests\n\n");
        md.push_str("| Test | Attempts | Avg raw | Avg band |\n");
        md.push_str("|------|----------|---------|----------|\n");

        let mut tests: Vec<_> = report.aggregate.per_test.values().collect();
        tests.sort_by(|a, b| a.test_id.cmp(&b.test_id));
        for stats in tests {
            md.push_str(&format!(
                "| {} | {} | {:.1} | {:.1} |\n",
                stats.test_id, stats.attempts, stats.avg_raw_score, stats.avg_band
            ));
        }
        md.push('\n');
    }

    if !report.aggregate.band_histogram.is_empty() {
        md.push_str("## Band distribution\n\n");
        md.push_str("| Band | Attempts |\n");
        md.push_str("|------|----------|\n");
        for (band, count) in &report.aggregate.band_histogram {
            md.push_str(&format!("| {band} | {count} |\n"));
        }
    }

    md
}

/// Write a markdown report to a file.
pub fn write_markdown_report(report: &ProgressReport, path: &Path) -> Result<()> {
    let md = generate_markdown(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, md)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandmark_core::band::band_for_raw;
    use bandmark_core::model::AttemptRecord;
    use bandmark_core::statistics::compute_aggregate_stats;
    use std::collections::BTreeMap;

    fn make_report() -> ProgressReport {
        let attempts = vec![AttemptRecord {
            id: uuid::Uuid::nil(),
            learner_id: "amy".into(),
            test_id: "academic-reading-1".into(),
            raw_score: 30,
            band: band_for_raw(30),
            answers: BTreeMap::new(),
            submitted_at: chrono::Utc::now(),
        }];
        let aggregate = compute_aggregate_stats(&attempts);
        ProgressReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            attempts,
            aggregate,
        }
    }

    #[test]
    fn markdown_contains_tables() {
        let md = generate_markdown(&make_report());
        assert!(md.contains("## Learners"));
        assert!(md.contains("| amy | 1 | 7.0 | 7.0 |"));
        assert!(md.contains("## Band distribution"));
        assert!(md.contains("| 7.0 | 1 |"));
    }

    #[test]
    fn markdown_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        write_markdown_report(&make_report(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("bandmark progress report"));
    }
}
