use super::{PipelineStep, StepResult};
use crate::config::Config;
use crate::constants;
use crate::error::Result;
use crate::pipeline::processing::merge_records;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Joins the three extracts row by row
pub struct ConsolidateStep {
    inputs: Vec<PathBuf>,
    output: PathBuf,
}

impl ConsolidateStep {
    pub fn new(config: &Config) -> Self {
        let paths = &config.paths;
        Self {
            inputs: vec![
                paths.resolve(&paths.csv_extract),
                paths.resolve(&paths.tsv_extract),
                paths.resolve(&paths.fixed_width_extract),
            ],
            output: paths.resolve(&paths.merged),
        }
    }
}

#[async_trait]
impl PipelineStep for ConsolidateStep {
    #[instrument(skip(self), fields(output = %self.output.display()))]
    async fn execute(&self) -> Result<StepResult> {
        info!("🔗 Consolidating {} extracts", self.inputs.len());
        let count = merge_records(&self.inputs, &self.output)?;
        let message = format!("Consolidated {} records into {}", count, self.output.display());
        Ok(StepResult::success(count, vec![self.output.clone()], message))
    }

    fn step_name(&self) -> &'static str {
        constants::CONSOLIDATE_DATA
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![
            constants::EXTRACT_DATA_FROM_CSV,
            constants::EXTRACT_DATA_FROM_TSV,
            constants::EXTRACT_DATA_FROM_FIXED_WIDTH,
        ]
    }
}
