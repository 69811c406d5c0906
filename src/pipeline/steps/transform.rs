use super::{PipelineStep, StepResult};
use crate::config::Config;
use crate::constants;
use crate::error::Result;
use crate::pipeline::processing::uppercase_column;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Uppercases the vehicle type column and writes the staged file
pub struct TransformStep {
    input: PathBuf,
    output: PathBuf,
    column: usize,
}

impl TransformStep {
    pub fn new(config: &Config) -> Self {
        Self {
            input: config.paths.resolve(&config.paths.merged),
            output: config.paths.resolve(&config.paths.staged),
            column: config.transform.column,
        }
    }
}

#[async_trait]
impl PipelineStep for TransformStep {
    #[instrument(skip(self), fields(output = %self.output.display()))]
    async fn execute(&self) -> Result<StepResult> {
        info!("🔠 Uppercasing column {}", self.column);
        let count = uppercase_column(&self.input, &self.output, self.column)?;
        let message = format!("Staged {} records into {}", count, self.output.display());
        Ok(StepResult::success(count, vec![self.output.clone()], message))
    }

    fn step_name(&self) -> &'static str {
        constants::TRANSFORM_DATA
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![constants::CONSOLIDATE_DATA]
    }
}
