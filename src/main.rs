//! Retail session pipeline
//!
//! Batch jobs over a retail event log:
//! - Sessionization and temporal train/test split
//! - Leave-one-out labels for the test sessions
//! - Recall@K / MRR scoring of next-item predictions
//! - Item category enrichment from the category tree

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use pipeline_jobs::{run_categories, run_evaluate, run_labels, run_split, PipelineConfig};
use telemetry::init_tracing_from_env;

#[derive(Parser, Debug)]
#[command(name = "retail-sessions", version)]
#[command(about = "Build, split, label and evaluate retail sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sessionize the raw event log and write train_set.csv / test_set.csv
    Split {
        /// Raw event log (events.csv)
        #[arg(long)]
        input_path: PathBuf,

        /// Directory for the split files
        #[arg(long)]
        output_path: PathBuf,

        /// Inactivity gap that closes a session, in seconds
        #[arg(long)]
        session_gap_secs: Option<u32>,

        #[command(flatten)]
        windows: WindowArgs,
    },

    /// Trim test sessions and write leave-one-out labels
    Labels {
        /// Test split (test_set.csv)
        #[arg(long)]
        test_set: PathBuf,

        /// Directory for test_sessions.jsonl / test_labels.jsonl
        #[arg(long)]
        output_path: PathBuf,

        /// Seed for the cut points
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score predictions against test labels
    Evaluate {
        #[arg(long, default_value = "resources/test_labels.jsonl")]
        test_labels: PathBuf,

        #[arg(long, default_value = "resources/predictions.csv")]
        predictions: PathBuf,

        /// Recall cutoff
        #[arg(long)]
        k: Option<usize>,

        /// Print scores as JSON
        #[arg(long)]
        json: bool,
    },

    /// Join item category properties with the category tree
    Categories {
        /// Directory holding train_set.csv
        #[arg(long)]
        train_set_path: PathBuf,

        /// Directory holding category_tree.csv and item_properties_part{1,2}.csv
        #[arg(long)]
        input_path: PathBuf,

        /// Directory for item_categories.csv
        #[arg(long)]
        output_path: PathBuf,

        #[command(flatten)]
        windows: WindowArgs,
    },
}

#[derive(Args, Debug)]
struct WindowArgs {
    /// Weeks in the train window
    #[arg(long, allow_negative_numbers = true)]
    train_weeks: Option<i64>,

    /// Weeks in the test window
    #[arg(long, allow_negative_numbers = true)]
    test_weeks: Option<i64>,
}

impl WindowArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(weeks) = self.train_weeks {
            config.train_weeks = weeks;
        }
        if let Some(weeks) = self.test_weeks {
            config.test_weeks = weeks;
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    let cli = Cli::parse();
    let mut config = load_config()?;
    apply_overrides(&mut config, &cli.command);
    config.check().context("Invalid pipeline configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config,
        "Starting retail-sessions"
    );

    if let Err(e) = run(&config, cli.command) {
        match e.downcast_ref::<sessions_core::Error>() {
            Some(inner) => error!(code = inner.error_code().unwrap_or("NONE"), "{:#}", e),
            None => error!("{:#}", e),
        }
        return Err(e);
    }
    Ok(())
}

fn run(config: &PipelineConfig, command: Command) -> Result<()> {
    match command {
        Command::Split {
            input_path,
            output_path,
            ..
        } => {
            run_split(config, &input_path, &output_path)
                .with_context(|| format!("Split job failed for {}", input_path.display()))?;
        }
        Command::Labels {
            test_set,
            output_path,
            ..
        } => {
            run_labels(config, &test_set, &output_path)
                .with_context(|| format!("Labels job failed for {}", test_set.display()))?;
        }
        Command::Evaluate {
            test_labels,
            predictions,
            json,
            ..
        } => {
            let scores = run_evaluate(config, &test_labels, &predictions)
                .with_context(|| format!("Evaluation failed for {}", predictions.display()))?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&scores).context("Failed to serialize scores")?
                );
            } else {
                println!("{}", scores);
            }
        }
        Command::Categories {
            train_set_path,
            input_path,
            output_path,
            ..
        } => {
            run_categories(config, &train_set_path, &input_path, &output_path)
                .with_context(|| format!("Categories job failed for {}", input_path.display()))?;
        }
    }
    Ok(())
}

/// Applies explicit command-line flags over the loaded configuration.
fn apply_overrides(config: &mut PipelineConfig, command: &Command) {
    match command {
        Command::Split {
            session_gap_secs,
            windows,
            ..
        } => {
            if let Some(gap) = session_gap_secs {
                config.session_gap_secs = *gap;
            }
            windows.apply(config);
        }
        Command::Labels { seed, .. } => {
            if let Some(seed) = seed {
                config.seed = *seed;
            }
        }
        Command::Evaluate { k, .. } => {
            if let Some(k) = k {
                config.k = *k;
            }
        }
        Command::Categories { windows, .. } => windows.apply(config),
    }
}

/// Load configuration from defaults, `config/default.toml` and `RETAIL_*`
/// environment variables.
fn load_config() -> Result<PipelineConfig> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&PipelineConfig::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. RETAIL_SESSION_GAP_SECS
        .add_source(
            config::Environment::with_prefix("RETAIL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
