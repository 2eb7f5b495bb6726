//! HTML report generator.
//!
//! Produces a self-contained progress page with all CSS/JS inlined.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use bandmark_core::report::ProgressReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a progress report.
pub fn generate_html(report: &ProgressReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>bandmark progress report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>bandmark progress report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} attempts | {} learners | {} tests | {}</p>\n",
        report.attempts.len(),
        report.aggregate.per_learner.len(),
        report.aggregate.per_test.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Learner summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Learners</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Learner</th><th>Attempts</th><th>Best band</th><th>Latest band</th><th>Avg raw</th><th>Streak</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    let mut learners: Vec<_> = report.aggregate.per_learner.values().collect();
    learners.sort_by(|a, b| a.learner_id.cmp(&b.learner_id));
    for stats in learners {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{} day(s)</td></tr>\n",
            html_escape(&stats.learner_id),
            stats.attempts,
            stats.best_band,
            stats.latest_band,
            stats.avg_raw_score,
            stats.streak_days,
        ));
    }
    html.push_str("</tbody></table>\n");

    // SVG bar chart for the band distribution
    if !report.aggregate.band_histogram.is_empty() {
        html.push_str("<h2>Band distribution</h2>\n");
        html.push_str(&generate_bar_chart(&report.aggregate.band_histogram));
    }

    html.push_str("</section>\n");

    // Per-attempt table
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Attempts</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"attempts\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Learner</th><th onclick=\"sortTable(1)\">Test</th><th onclick=\"sortTable(2)\">Raw</th><th onclick=\"sortTable(3)\">Band</th><th onclick=\"sortTable(4)\">Submitted</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for attempt in &report.attempts {
        let band_class = if attempt.band.as_f64() >= 6.0 {
            "pass"
        } else {
            "fail"
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            html_escape(&attempt.learner_id),
            html_escape(&attempt.test_id),
            attempt.raw_score,
            band_class,
            attempt.band,
            attempt.submitted_at.format("%Y-%m-%d %H:%M"),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ProgressReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(histogram: &BTreeMap<String, usize>) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 80;

    let max_count = histogram.values().copied().max().unwrap_or(1).max(1);
    let total_height = histogram.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (band, count)) in histogram.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (count * max_width) / max_count;

        let band_value: f64 = band.parse().unwrap_or(0.0);
        let color = if band_value >= 7.0 {
            "#22c55e"
        } else if band_value >= 5.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(band)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            count
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('attempts');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use bandmark_core::band::band_for_raw;
    use bandmark_core::model::AttemptRecord;
    use bandmark_core::statistics::compute_aggregate_stats;

    fn make_test_report() -> ProgressReport {
        let attempts = vec![
            AttemptRecord {
                id: uuid::Uuid::nil(),
                learner_id: "amy".into(),
                test_id: "academic-reading-1".into(),
                raw_score: 30,
                band: band_for_raw(30),
                answers: BTreeMap::new(),
                submitted_at: chrono::Utc::now(),
            },
            AttemptRecord {
                id: uuid::Uuid::nil(),
                learner_id: "ben".into(),
                test_id: "academic-reading-1".into(),
                raw_score: 8,
                band: band_for_raw(8),
                answers: BTreeMap::new(),
                submitted_at: chrono::Utc::now(),
            },
        ];
        let aggregate = compute_aggregate_stats(&attempts);
        ProgressReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            attempts,
            aggregate,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("amy"));
        assert!(html.contains("academic-reading-1"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
