use super::pipeline_config::{PipelineConfig, PipelineStepConfig};
use super::steps::{
    ConsolidateStep, ExtractDelimitedStep, ExtractFixedWidthStep, PipelineStep, StepResult,
    TransformStep, UnzipStep,
};
use crate::config::{Config, RetryConfig};
use crate::error::{EtlError, Result};
use crate::fingerprint::sha256_file;
use crate::notify::{LogNotifier, Notification, NotificationKind, Notifier};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs pipeline steps in order, retrying a failed step before giving up
pub struct PipelineOrchestrator {
    config: Config,
    notifier: Arc<dyn Notifier>,
}

impl PipelineOrchestrator {
    pub fn new(config: Config) -> Self {
        let notifier = Arc::new(LogNotifier::new(&config.notify));
        Self { config, notifier }
    }

    pub fn with_notifier(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a complete pipeline based on configuration
    pub async fn run_pipeline(&self, pipeline: &PipelineConfig) -> Result<PipelineExecutionResult> {
        pipeline.validate()?;
        let steps = pipeline
            .steps
            .iter()
            .map(|step| self.create_step(*step))
            .collect();

        let staged = self.config.paths.resolve(&self.config.paths.staged);
        self.run_steps(&pipeline.name, steps, Some(staged)).await
    }

    /// Run already-built steps in order, stopping at the first step that
    /// still fails after its retries.
    pub async fn run_steps(
        &self,
        pipeline_name: &str,
        steps: Vec<Box<dyn PipelineStep>>,
        staged_output: Option<PathBuf>,
    ) -> Result<PipelineExecutionResult> {
        let mut execution = PipelineExecutionResult::new(pipeline_name.to_string());
        let run_id = execution.run_id;
        let span = info_span!("pipeline_run", %run_id, pipeline = %pipeline_name);

        async {
            info!("🚀 Starting pipeline '{}' ({} steps)", pipeline_name, steps.len());
            let mut completed: HashSet<&'static str> = HashSet::new();

            for (index, step) in steps.iter().enumerate() {
                let name = step.step_name();
                if let Some(missing) = step.dependencies().into_iter().find(|d| !completed.contains(d)) {
                    return Err(EtlError::Config(format!(
                        "Step '{}' depends on '{}' which has not run",
                        name, missing
                    )));
                }

                info!("🔄 Executing step {}/{}: {}", index + 1, steps.len(), name);
                let outcome = execute_with_retry(
                    step.as_ref(),
                    &self.config.retry,
                    self.notifier.as_ref(),
                    self.config.notify.on_retry,
                    run_id,
                )
                .await;

                let failed = outcome.error.is_some();
                if failed {
                    let message = outcome.error.clone().unwrap_or_default();
                    error!("❌ Step '{}' failed after {} attempt(s): {}", name, outcome.attempts, message);
                    if self.config.notify.on_failure {
                        self.notifier
                            .notify(&Notification {
                                kind: NotificationKind::Failure,
                                run_id,
                                step: name.to_string(),
                                attempt: outcome.attempts,
                                message: message.clone(),
                            })
                            .await;
                    }
                    execution.success = false;
                    execution.error = Some(format!("{}: {}", name, message));
                } else {
                    completed.insert(name);
                }
                execution.steps.push(outcome);

                if failed {
                    warn!("⏹️ Stopping pipeline; {} later step(s) not run", steps.len() - index - 1);
                    break;
                }
            }

            if execution.success {
                if let Some(staged) = staged_output {
                    execution.staged_sha256 = Some(sha256_file(&staged)?);
                    execution.staged_output = Some(staged);
                }
            }
            execution.complete();

            if execution.success {
                info!(
                    "🎉 Pipeline '{}' completed: {} records processed",
                    pipeline_name,
                    execution.total_processed()
                );
            } else {
                error!("💥 Pipeline '{}' failed", pipeline_name);
            }
            Ok::<(), EtlError>(())
        }
        .instrument(span)
        .await?;

        Ok(execution)
    }

    /// Run a single step once, without retries
    pub async fn run_step(&self, step_config: PipelineStepConfig) -> Result<StepResult> {
        info!("🔄 Running single step '{}'", step_config.step_name());
        let step = self.create_step(step_config);
        step.execute().await
    }

    /// Create a step instance from configuration
    pub fn create_step(&self, step_config: PipelineStepConfig) -> Box<dyn PipelineStep> {
        let config = &self.config;
        match step_config {
            PipelineStepConfig::UnzipData => Box::new(UnzipStep::new(config)),
            PipelineStepConfig::ExtractDataFromCsv => Box::new(ExtractDelimitedStep::csv(config)),
            PipelineStepConfig::ExtractDataFromTsv => Box::new(ExtractDelimitedStep::tsv(config)),
            PipelineStepConfig::ExtractDataFromFixedWidth => {
                Box::new(ExtractFixedWidthStep::new(config))
            }
            PipelineStepConfig::ConsolidateData => Box::new(ConsolidateStep::new(config)),
            PipelineStepConfig::TransformData => Box::new(TransformStep::new(config)),
        }
    }
}

/// Execute a step, retrying up to `policy.retries` times after `policy.delay`.
pub async fn execute_with_retry(
    step: &dyn PipelineStep,
    policy: &RetryConfig,
    notifier: &dyn Notifier,
    notify_on_retry: bool,
    run_id: Uuid,
) -> StepOutcome {
    let name = step.step_name();
    let max_attempts = policy.retries.saturating_add(1);
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        counter!("tolldata_step_runs_total", "step" => name).increment(1);

        match step.execute().await {
            Ok(result) => {
                info!("✅ Step '{}' completed: {}", name, result.message);
                counter!("tolldata_records_processed_total", "step" => name)
                    .increment(result.processed_count as u64);
                histogram!("tolldata_step_duration_seconds", "step" => name)
                    .record(started.elapsed().as_secs_f64());
                return StepOutcome {
                    step_name: name.to_string(),
                    attempts: attempt,
                    duration_ms: started.elapsed().as_millis() as u64,
                    result: Some(result),
                    error: None,
                };
            }
            Err(e) => {
                counter!("tolldata_step_failures_total", "step" => name).increment(1);
                if attempt >= max_attempts {
                    return StepOutcome {
                        step_name: name.to_string(),
                        attempts: attempt,
                        duration_ms: started.elapsed().as_millis() as u64,
                        result: None,
                        error: Some(e.to_string()),
                    };
                }

                warn!(
                    "⚠️ Step '{}' attempt {}/{} failed: {}; retrying in {:?}",
                    name, attempt, max_attempts, e, policy.delay
                );
                counter!("tolldata_step_retries_total", "step" => name).increment(1);
                if notify_on_retry {
                    notifier
                        .notify(&Notification {
                            kind: NotificationKind::Retry,
                            run_id,
                            step: name.to_string(),
                            attempt,
                            message: e.to_string(),
                        })
                        .await;
                }
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

/// What happened to one step during a run
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step_name: String,
    pub attempts: u32,
    pub duration_ms: u64,
    pub result: Option<StepResult>,
    pub error: Option<String>,
}

/// Result of executing a complete pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineExecutionResult {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub success: bool,
    pub steps: Vec<StepOutcome>,
    pub error: Option<String>,
    pub staged_output: Option<PathBuf>,
    pub staged_sha256: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineExecutionResult {
    pub fn new(pipeline_name: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline_name,
            success: true,
            steps: Vec::new(),
            error: None,
            staged_output: None,
            staged_sha256: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    pub fn total_processed(&self) -> usize {
        self.steps
            .iter()
            .filter_map(|s| s.result.as_ref())
            .map(|r| r.processed_count)
            .sum()
    }

    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step_name == name)
    }
}
