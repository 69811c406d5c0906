use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tolldata_etl::config::Config;
use tolldata_etl::pipeline::{PipelineConfig, PipelineOrchestrator, PipelineStepConfig};
use tolldata_etl::{constants, logging};
use tracing::info;

#[derive(Parser)]
#[command(name = "tolldata_etl")]
#[command(about = "Stage daily toll plaza data from the source archive")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Config file (default: $TOLLDATA_ETL_CONFIG or ./tolldata_etl.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the archive and every intermediate file
    #[arg(long)]
    work_dir: Option<PathBuf>,
    /// Source archive (relative paths resolve against the work directory)
    #[arg(long)]
    archive: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all six steps in order
    Run {
        #[command(flatten)]
        common: CommonArgs,
        /// Retries per failed step
        #[arg(long)]
        retries: Option<u32>,
        /// Wait before retrying a failed step, e.g. "5m" or "30s"
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        retry_delay: Option<Duration>,
        /// Write the run report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run a single step once
    Step {
        /// Step id, see `tolldata_etl steps`
        step_id: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// List step ids in execution order
    Steps,
    /// Print the effective configuration as TOML
    ShowConfig {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn load_config(common: &CommonArgs) -> Result<Config> {
    let mut config = Config::load(common.config.as_deref()).context("Failed to load configuration")?;
    if let Some(work_dir) = &common.work_dir {
        config.paths.work_dir = work_dir.clone();
    }
    if let Some(archive) = &common.archive {
        config.paths.archive = archive.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Steps => {
            for (i, step) in constants::get_step_ids().iter().enumerate() {
                println!("{}. {}", i + 1, step);
            }
        }
        Commands::ShowConfig { common } => {
            let config = load_config(&common)?;
            print!("{}", config.to_toml()?);
        }
        Commands::Step { step_id, common } => {
            let config = load_config(&common)?;
            let _guard = logging::init_logging(&config.logging.dir);
            let step = PipelineStepConfig::from_step_id(&step_id)?;

            let orchestrator = PipelineOrchestrator::new(config);
            let result = orchestrator
                .run_step(step)
                .await
                .with_context(|| format!("Step '{}' failed", step_id))?;
            println!("✅ {}", result.message);
        }
        Commands::Run {
            common,
            retries,
            retry_delay,
            report,
        } => {
            let mut config = load_config(&common)?;
            if let Some(retries) = retries {
                config.retry.retries = retries;
            }
            if let Some(delay) = retry_delay {
                config.retry.delay = delay;
            }
            let _guard = logging::init_logging(&config.logging.dir);
            info!(work_dir = %config.paths.work_dir.display(), "Starting toll data run");

            let orchestrator = PipelineOrchestrator::new(config);
            let result = orchestrator.run_pipeline(&PipelineConfig::toll_data()).await?;

            println!("\n📊 Pipeline Results for {} (run {}):", result.pipeline_name, result.run_id);
            for step in &result.steps {
                match (&step.result, &step.error) {
                    (Some(r), _) => println!(
                        "   ✅ {:<30} {:>8} records  ({} attempt(s))",
                        step.step_name, r.processed_count, step.attempts
                    ),
                    (None, Some(e)) => println!(
                        "   ❌ {:<30} {}  ({} attempt(s))",
                        step.step_name, e, step.attempts
                    ),
                    (None, None) => {}
                }
            }
            if let (Some(path), Some(sha)) = (&result.staged_output, &result.staged_sha256) {
                println!("   Staged file: {} (sha256 {})", path.display(), sha);
            }
            if let Some(duration) = result.duration() {
                println!("   Duration: {} ms", duration.num_milliseconds());
            }

            if let Some(report_path) = report {
                let body = serde_json::to_string_pretty(&result)?;
                fs::write(&report_path, body)
                    .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
                println!("💾 Saved run report to {}", report_path.display());
            }

            if !result.success {
                bail!(
                    "Pipeline run {} failed: {}",
                    result.run_id,
                    result.error.unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}
