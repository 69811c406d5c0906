use super::{PipelineStep, StepResult};
use crate::config::Config;
use crate::constants;
use crate::error::Result;
use crate::pipeline::processing::records::{COMMA, TAB};
use crate::pipeline::processing::{extract_columns, extract_ranges, CharRange, ColumnSelection};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Keeps a column subset of a delimited source file
pub struct ExtractDelimitedStep {
    name: &'static str,
    input: PathBuf,
    output: PathBuf,
    delimiter: u8,
    columns: ColumnSelection,
}

impl ExtractDelimitedStep {
    /// Vehicle data, comma-delimited
    pub fn csv(config: &Config) -> Self {
        Self {
            name: constants::EXTRACT_DATA_FROM_CSV,
            input: config.paths.resolve(&config.paths.vehicle_data),
            output: config.paths.resolve(&config.paths.csv_extract),
            delimiter: COMMA,
            columns: config.extract.csv_columns.clone(),
        }
    }

    /// Toll plaza data, tab-delimited
    pub fn tsv(config: &Config) -> Self {
        Self {
            name: constants::EXTRACT_DATA_FROM_TSV,
            input: config.paths.resolve(&config.paths.tollplaza_data),
            output: config.paths.resolve(&config.paths.tsv_extract),
            delimiter: TAB,
            columns: config.extract.tsv_columns.clone(),
        }
    }
}

#[async_trait]
impl PipelineStep for ExtractDelimitedStep {
    #[instrument(skip(self), fields(step = self.name, input = %self.input.display()))]
    async fn execute(&self) -> Result<StepResult> {
        info!("✂️ Extracting columns {:?}", self.columns.positions());
        let count = extract_columns(&self.input, &self.output, self.delimiter, &self.columns)?;
        let message = format!(
            "Extracted {} records with {} columns into {}",
            count,
            self.columns.positions().len(),
            self.output.display()
        );
        Ok(StepResult::success(count, vec![self.output.clone()], message))
    }

    fn step_name(&self) -> &'static str {
        self.name
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![constants::UNZIP_DATA]
    }
}

/// Slices fixed character ranges out of the payment data
pub struct ExtractFixedWidthStep {
    input: PathBuf,
    output: PathBuf,
    ranges: Vec<CharRange>,
}

impl ExtractFixedWidthStep {
    pub fn new(config: &Config) -> Self {
        Self {
            input: config.paths.resolve(&config.paths.payment_data),
            output: config.paths.resolve(&config.paths.fixed_width_extract),
            ranges: config.extract.fixed_width_ranges.clone(),
        }
    }
}

#[async_trait]
impl PipelineStep for ExtractFixedWidthStep {
    #[instrument(skip(self), fields(input = %self.input.display()))]
    async fn execute(&self) -> Result<StepResult> {
        info!("✂️ Extracting {} fixed-width fields", self.ranges.len());
        let count = extract_ranges(&self.input, &self.output, &self.ranges)?;
        let message = format!(
            "Extracted {} records with {} fields into {}",
            count,
            self.ranges.len(),
            self.output.display()
        );
        Ok(StepResult::success(count, vec![self.output.clone()], message))
    }

    fn step_name(&self) -> &'static str {
        constants::EXTRACT_DATA_FROM_FIXED_WIDTH
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![constants::UNZIP_DATA]
    }
}
