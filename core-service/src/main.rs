//! Student Analytics CLI
//!
//! `generate` writes a synthetic raw table, `run` trains the classifier,
//! mines rules and replaces both output tables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use student_analytics_core::constants::{
    APP_NAME, APP_VERSION, DEFAULT_DATA_DIR, DEFAULT_GENERATED_ROWS, DISPLAY_PRECISION,
};
use student_analytics_core::logic::generator::store_generated;
use student_analytics_core::logic::query;
use student_analytics_core::{FileStore, Generator, Pipeline, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "student-analytics", version, about = "Student performance classification and rule mining")]
struct Cli {
    /// Directory holding the student tables
    #[arg(long, env = "DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a synthetic raw student table, replacing any existing one.
    Generate {
        /// Number of students
        #[arg(long, default_value_t = DEFAULT_GENERATED_ROWS)]
        rows: usize,

        /// Seed for a reproducible table
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the classification and rule-mining pipeline over the raw table.
    Run {
        /// JSON file with pipeline settings; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Print the run report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Pipeline settings given on the command line
#[derive(Args, Debug, Default, Clone)]
struct Overrides {
    /// Seed for the tree's feature ordering
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long)]
    min_support: Option<f64>,

    #[arg(long)]
    min_confidence: Option<f64>,
}

impl Overrides {
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if self.min_support.is_some() || self.min_confidence.is_some() {
            let support = self.min_support.unwrap_or(config.min_support);
            let confidence = self.min_confidence.unwrap_or(config.min_confidence);
            config = config.with_thresholds(support, confidence);
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = FileStore::new(&cli.data_dir);

    log::info!("{} v{} (data dir: {})", APP_NAME, APP_VERSION, cli.data_dir.display());

    match cli.command {
        Command::Generate { rows, seed } => {
            let mut generator = match seed {
                Some(seed) => Generator::with_seed(rows, seed),
                None => Generator::new(rows),
            };
            let records = generator.generate();
            store_generated(&store, &records).context("Failed to write generated table")?;
            println!(
                "Generated {} students into {}",
                records.len(),
                store.path(student_analytics_core::Table::RawStudents).display()
            );
        }
        Command::Run {
            config,
            overrides,
            json,
        } => {
            let base = match config {
                Some(path) => load_config(&path)?,
                None => PipelineConfig::default(),
            };
            let config = overrides.apply(base);
            config.validate().context("Invalid pipeline settings")?;
            run_pipeline(&store, config, json)?
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

fn run_pipeline(store: &FileStore, config: PipelineConfig, json: bool) -> Result<()> {
    log::debug!("Pipeline config: {:?}", config);
    let pipeline = Pipeline::new(config);
    let report = pipeline.run(store).context("Pipeline run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n--- Decision Tree Rules ---");
    print!("{}", report.tree_text);

    println!("\n--- Predicted Performance ---");
    for (level, count) in &report.predicted_distribution {
        println!("{:<8} {}", level, count);
    }
    println!("Training accuracy: {:.3}", report.training_accuracy);

    println!("\n--- Apriori Association Rules ---");
    let p = DISPLAY_PRECISION as usize;
    for rule in query::load_rules(store).context("Failed to read rules table")? {
        println!(
            "If [{}] --> [{}]: support={:.p$}, confidence={:.p$}",
            rule.antecedents,
            rule.consequents,
            rule.support,
            rule.confidence,
            p = p,
        );
    }

    println!("\nResults saved to '{}'", store.base_dir().display());
    Ok(())
}
