//! Daily toll data staging pipeline.
//!
//! Six steps run in order, each reading the previous steps' files and
//! writing one new file: unpack the source archive, extract columns from the
//! comma-delimited, tab-delimited and fixed-width sources, merge the three
//! extracts row by row, and uppercase the vehicle type column.

pub mod config;
pub mod constants;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod notify;
pub mod pipeline;

pub use config::Config;
pub use error::{EtlError, Result};
pub use pipeline::{PipelineConfig, PipelineExecutionResult, PipelineOrchestrator, PipelineStepConfig};
