pub mod orchestrator;
pub mod pipeline_config;
pub mod processing;
pub mod steps;

pub use orchestrator::{PipelineExecutionResult, PipelineOrchestrator, StepOutcome};
pub use pipeline_config::{PipelineConfig, PipelineStepConfig};
pub use steps::{PipelineStep, StepResult};
