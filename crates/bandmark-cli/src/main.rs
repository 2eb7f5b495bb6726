//! bandmark CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bandmark", version, about = "IELTS practice-test scoring and attempt tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a submission locally without persisting it
    Score {
        /// Path to the practice test .toml file
        #[arg(long)]
        test: PathBuf,

        /// Path to the submission .toml file
        #[arg(long)]
        submission: PathBuf,

        /// Also write the scored result as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Score a submission and persist the attempt to the configured store
    Submit {
        /// Path to a submission .toml file, or a directory of them
        #[arg(long)]
        submission: PathBuf,

        /// Score against a local test file instead of fetching the answer key
        #[arg(long)]
        test_file: Option<PathBuf>,

        /// Max concurrent submissions
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build a progress report from stored attempts
    Report {
        /// Read attempts from a JSON export instead of the store
        #[arg(long)]
        input: Option<PathBuf>,

        /// Restrict to one learner
        #[arg(long)]
        learner: Option<String>,

        /// Output directory
        #[arg(long, default_value = "./bandmark-results")]
        output: PathBuf,

        /// Output format: json, markdown, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two progress reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Band-point change that counts as significant
        #[arg(long, default_value = "0.0")]
        threshold: f64,

        /// Exit code 1 if any pair declined
        #[arg(long)]
        fail_on_declines: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate practice test TOML files
    Validate {
        /// Path to a practice test file or directory
        #[arg(long)]
        test: PathBuf,
    },

    /// Create starter config and example practice test
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bandmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            test,
            submission,
            json,
        } => commands::score::execute(test, submission, json),
        Commands::Submit {
            submission,
            test_file,
            parallelism,
            config,
        } => commands::submit::execute(submission, test_file, parallelism, config).await,
        Commands::Report {
            input,
            learner,
            output,
            format,
            config,
        } => commands::report::execute(input, learner, output, format, config).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_declines,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_declines, format),
        Commands::Validate { test } => commands::validate::execute(test),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
