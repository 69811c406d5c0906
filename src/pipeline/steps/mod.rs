use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

/// Common trait for all pipeline steps
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Execute this step once, reading its inputs and writing its output file
    async fn execute(&self) -> Result<StepResult>;

    /// Get the step id
    fn step_name(&self) -> &'static str;

    /// Steps whose outputs this step reads
    fn dependencies(&self) -> Vec<&'static str>;
}

/// Result of executing a pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub processed_count: usize,
    pub outputs: Vec<PathBuf>,
    pub message: String,
}

impl StepResult {
    pub fn success(processed: usize, outputs: Vec<PathBuf>, message: String) -> Self {
        Self {
            processed_count: processed,
            outputs,
            message,
        }
    }
}

pub mod consolidate;
pub mod extract;
pub mod transform;
pub mod unzip;

pub use consolidate::ConsolidateStep;
pub use extract::{ExtractDelimitedStep, ExtractFixedWidthStep};
pub use transform::TransformStep;
pub use unzip::UnzipStep;
