//! riffle CLI: validate, explain, and run YAML stream pipelines.

use clap::{Parser, Subcommand};
use riffle_core::config::EngineConfig;
use riffle_observable::Stream;
use riffle_planner::{lower, parse_yaml_pipeline_with, rules, ParsedPipeline};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "riffle")]
#[command(about = "riffle: push-based stream pipelines with purity-driven fusion", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline over a list of integers
    Run {
        /// Path to the pipeline YAML file
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Comma-separated input values, e.g. 1,2,3
        #[arg(short, long, default_value = "")]
        input: String,

        /// Disable stage fusion (overrides config)
        #[arg(long)]
        no_fusion: bool,

        /// Cap on stages per fused pass (overrides config)
        #[arg(long)]
        max_fused_stages: Option<usize>,
    },

    /// Validate a pipeline YAML file
    Validate {
        /// Path to the pipeline YAML file
        #[arg(short, long)]
        pipeline: PathBuf,
    },

    /// Show the plan before and after fusion (EXPLAIN)
    Explain {
        /// Path to the pipeline YAML file
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Disable stage fusion (overrides config)
        #[arg(long)]
        no_fusion: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            pipeline,
            input,
            no_fusion,
            max_fused_stages,
        } => {
            if let Err(e) = run_pipeline(&pipeline, &input, no_fusion, max_fused_stages) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { pipeline } => {
            if let Err(e) = validate_pipeline(&pipeline) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
            println!("✓ Pipeline is valid");
        }
        Commands::Explain {
            pipeline,
            no_fusion,
        } => {
            if let Err(e) = explain_pipeline(&pipeline, no_fusion) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(pipeline_path: &PathBuf) -> Result<ParsedPipeline, Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(pipeline_path)?;
    let parsed = parse_yaml_pipeline_with(&yaml_content, EngineConfig::from_env())?;
    tracing::debug!(
        path = %pipeline_path.display(),
        stages = parsed.plan.len(),
        "loaded pipeline"
    );
    Ok(parsed)
}

/// CLI flags win over the pipeline's `config:` block, which wins over the
/// environment.
fn apply_cli_overrides(cfg: &mut EngineConfig, no_fusion: bool, max_fused_stages: Option<usize>) {
    if no_fusion {
        cfg.fusion_enabled = false;
    }
    if let Some(max) = max_fused_stages {
        cfg.max_fused_stages = max;
    }
}

fn parse_input(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<i64>)
        .collect()
}

fn run_pipeline(
    pipeline_path: &PathBuf,
    input: &str,
    no_fusion: bool,
    max_fused_stages: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load(pipeline_path)?;
    let mut config = parsed.config;
    apply_cli_overrides(&mut config, no_fusion, max_fused_stages);
    config.validate()?;

    let values = parse_input(input)?;
    let optimized = rules::optimize(parsed.plan, &config);
    tracing::info!(stages = optimized.len(), fusion = config.fusion_enabled, "running pipeline");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let output = runtime.block_on(async {
        let source = Stream::from_array(values);
        lower(&optimized, &source).to_array().await
    })?;

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn validate_pipeline(pipeline_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let _ = load(pipeline_path)?;
    Ok(())
}

fn explain_pipeline(
    pipeline_path: &PathBuf,
    no_fusion: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load(pipeline_path)?;
    let mut config = parsed.config;
    apply_cli_overrides(&mut config, no_fusion, None);

    let before = parsed.plan.summary();
    let reorder_candidates = parsed.plan.reorder_candidates();
    let optimized = rules::optimize(parsed.plan, &config);

    let report = serde_json::json!({
        "config": config,
        "before": before,
        "after": optimized.summary(),
        "reorder_candidates": reorder_candidates,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_cli_overrides, parse_input, EngineConfig};

    #[test]
    fn cli_overrides_higher_priority_than_config() {
        let mut config = EngineConfig {
            max_fused_stages: 4,
            ..EngineConfig::default()
        };
        apply_cli_overrides(&mut config, true, Some(2));
        assert!(!config.fusion_enabled);
        assert_eq!(config.max_fused_stages, 2);
    }

    #[test]
    fn input_list_tolerates_spaces_and_blanks() {
        assert_eq!(parse_input(" 1, 2,,3 ").unwrap(), vec![1, 2, 3]);
        assert!(parse_input("").unwrap().is_empty());
        assert!(parse_input("1,x").is_err());
    }
}
