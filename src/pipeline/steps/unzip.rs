use super::{PipelineStep, StepResult};
use crate::config::Config;
use crate::constants;
use crate::error::Result;
use crate::pipeline::processing::unpack_archive;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Unpacks the source archive into the work directory
pub struct UnzipStep {
    archive: PathBuf,
    dest: PathBuf,
    members: Vec<PathBuf>,
}

impl UnzipStep {
    pub fn new(config: &Config) -> Self {
        Self {
            archive: config.paths.resolve(&config.paths.archive),
            dest: config.paths.work_dir.clone(),
            members: config.paths.archive_members(),
        }
    }
}

#[async_trait]
impl PipelineStep for UnzipStep {
    #[instrument(skip(self), fields(archive = %self.archive.display()))]
    async fn execute(&self) -> Result<StepResult> {
        info!("📦 Unpacking archive into {}", self.dest.display());
        let unpacked = unpack_archive(&self.archive, &self.dest, &self.members)?;
        let message = format!(
            "Unpacked {} source files from {}",
            unpacked.len(),
            self.archive.display()
        );
        Ok(StepResult::success(unpacked.len(), unpacked, message))
    }

    fn step_name(&self) -> &'static str {
        constants::UNZIP_DATA
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
