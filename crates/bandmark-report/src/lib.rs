//! bandmark-report: progress report rendering.
//!
//! Turns a `ProgressReport` into a markdown summary or a self-contained HTML
//! page for the learner dashboard.

pub mod html;
pub mod markdown;

pub use html::write_html_report;
pub use markdown::write_markdown_report;
