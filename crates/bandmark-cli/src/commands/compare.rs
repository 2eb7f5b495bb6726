//! The `bandmark compare` command.

use std::path::PathBuf;

use anyhow::Result;

use bandmark_core::report::ProgressReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_declines: bool,
    format: String,
) -> Result<()> {
    let baseline = ProgressReport::load_json(&baseline_path)?;
    let current = ProgressReport::load_json(&current_path)?;

    let delta = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", delta.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&delta)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} improved, {} declined, {} unchanged",
                delta.improvements.len(),
                delta.declines.len(),
                delta.unchanged
            );

            if !delta.improvements.is_empty() {
                println!("\nImprovements:");
                for c in &delta.improvements {
                    println!(
                        "  {} ({}) {} -> {} (+{:.1})",
                        c.learner_id, c.test_id, c.baseline_band, c.current_band, c.delta
                    );
                }
            }

            if !delta.declines.is_empty() {
                println!("\nDeclines:");
                for c in &delta.declines {
                    println!(
                        "  {} ({}) {} -> {} ({:.1})",
                        c.learner_id, c.test_id, c.baseline_band, c.current_band, c.delta
                    );
                }
            }

            if delta.new_pairs > 0 {
                println!("\n{} new learner/test pair(s)", delta.new_pairs);
            }
            if delta.removed_pairs > 0 {
                println!("{} removed learner/test pair(s)", delta.removed_pairs);
            }
        }
    }

    if fail_on_declines && delta.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
