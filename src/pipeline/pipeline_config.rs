use crate::constants;
use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered list of steps a pipeline run executes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub steps: Vec<PipelineStepConfig>,
}

/// Configuration for individual pipeline steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStepConfig {
    UnzipData,
    ExtractDataFromCsv,
    ExtractDataFromTsv,
    ExtractDataFromFixedWidth,
    ConsolidateData,
    TransformData,
}

impl PipelineConfig {
    /// The daily toll data pipeline: unpack, extract three sources, merge, transform
    pub fn toll_data() -> Self {
        Self {
            name: "ETL_toll_data".to_string(),
            description: "Stage daily toll plaza data from the source archive".to_string(),
            steps: vec![
                PipelineStepConfig::UnzipData,
                PipelineStepConfig::ExtractDataFromCsv,
                PipelineStepConfig::ExtractDataFromTsv,
                PipelineStepConfig::ExtractDataFromFixedWidth,
                PipelineStepConfig::ConsolidateData,
                PipelineStepConfig::TransformData,
            ],
        }
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(EtlError::Config(
                "Pipeline must have at least one step".to_string(),
            ));
        }

        let mut seen_steps = HashSet::new();

        for step in &self.steps {
            let step_name = step.step_name();

            if !seen_steps.insert(step_name) {
                return Err(EtlError::Config(format!(
                    "Step '{}' appears more than once",
                    step_name
                )));
            }

            for dep in step.dependencies() {
                if !seen_steps.contains(dep) {
                    return Err(EtlError::Config(format!(
                        "Step '{}' depends on '{}' which does not run before it",
                        step_name, dep
                    )));
                }
            }
        }

        Ok(())
    }
}

impl PipelineStepConfig {
    /// Look up a step by its id
    pub fn from_step_id(step_id: &str) -> Result<Self> {
        match step_id {
            constants::UNZIP_DATA => Ok(Self::UnzipData),
            constants::EXTRACT_DATA_FROM_CSV => Ok(Self::ExtractDataFromCsv),
            constants::EXTRACT_DATA_FROM_TSV => Ok(Self::ExtractDataFromTsv),
            constants::EXTRACT_DATA_FROM_FIXED_WIDTH => Ok(Self::ExtractDataFromFixedWidth),
            constants::CONSOLIDATE_DATA => Ok(Self::ConsolidateData),
            constants::TRANSFORM_DATA => Ok(Self::TransformData),
            other => Err(EtlError::UnknownStep(other.to_string())),
        }
    }

    /// Get the step id
    pub fn step_name(&self) -> &'static str {
        match self {
            Self::UnzipData => constants::UNZIP_DATA,
            Self::ExtractDataFromCsv => constants::EXTRACT_DATA_FROM_CSV,
            Self::ExtractDataFromTsv => constants::EXTRACT_DATA_FROM_TSV,
            Self::ExtractDataFromFixedWidth => constants::EXTRACT_DATA_FROM_FIXED_WIDTH,
            Self::ConsolidateData => constants::CONSOLIDATE_DATA,
            Self::TransformData => constants::TRANSFORM_DATA,
        }
    }

    /// Get the dependencies for this step
    pub fn dependencies(&self) -> Vec<&'static str> {
        match self {
            Self::UnzipData => vec![],
            Self::ExtractDataFromCsv
            | Self::ExtractDataFromTsv
            | Self::ExtractDataFromFixedWidth => vec![constants::UNZIP_DATA],
            Self::ConsolidateData => vec![
                constants::EXTRACT_DATA_FROM_CSV,
                constants::EXTRACT_DATA_FROM_TSV,
                constants::EXTRACT_DATA_FROM_FIXED_WIDTH,
            ],
            Self::TransformData => vec![constants::CONSOLIDATE_DATA],
        }
    }
}
