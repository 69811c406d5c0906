use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use tolldata_etl::config::Config;
use tolldata_etl::constants;
use tolldata_etl::pipeline::{PipelineConfig, PipelineOrchestrator, PipelineStepConfig};

fn write_archive(path: &Path, members: &[(&str, &str)]) -> Result<()> {
    let encoder = GzEncoder::new(File::create(path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, body.as_bytes())?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

fn config_for(work_dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.work_dir = work_dir.to_path_buf();
    config.retry.retries = 0;
    config.retry.delay = Duration::ZERO;
    config
}

const VEHICLE_DATA: &str = "A,B,C,car,X\n2,Sat Jul 31 04:09:44 2021,174434,truck,2,VC965\n";
const TOLLPLAZA_DATA: &str = "p\tq\tr\n3\tMon Aug 09 09:57:12 2021\t8522\tx\n";
const PAYMENT_DATA: &str = "1234567890abcdefghij\nABCDEFGHIJklmnopqrst PTE VC965\n";

#[tokio::test]
async fn test_end_to_end_staged_record() -> Result<()> {
    let temp_dir = tempdir()?;
    let work_dir = temp_dir.path();
    write_archive(
        &work_dir.join(constants::DEFAULT_ARCHIVE),
        &[
            ("vehicle-data.csv", VEHICLE_DATA),
            ("tollplaza-data.tsv", TOLLPLAZA_DATA),
            ("payment-data.txt", PAYMENT_DATA),
        ],
    )?;

    let orchestrator = PipelineOrchestrator::new(config_for(work_dir));
    let result = orchestrator.run_pipeline(&PipelineConfig::toll_data()).await?;

    assert!(result.success, "run failed: {:?}", result.error);
    assert_eq!(result.steps.len(), 6);
    assert!(result.steps.iter().all(|s| s.attempts == 1));

    let staged_path = work_dir.join("staging_data.csv");
    assert_eq!(result.staged_output.as_deref(), Some(staged_path.as_path()));
    let staged = fs::read_to_string(&staged_path)?;
    assert_eq!(
        staged,
        "A,B,C,CAR,p,q,r,1234567890,abcdefghij\n\
         2,Sat Jul 31 04:09:44 2021,174434,TRUCK,3,Mon Aug 09 09:57:12 2021,8522,ABCDEFGHIJ,klmnopqrst\n"
    );

    // Intermediate extracts stay on disk with the expected shapes
    let csv = fs::read_to_string(work_dir.join(constants::DEFAULT_CSV_EXTRACT))?;
    assert_eq!(csv.lines().next(), Some("A,B,C,car"));
    let tsv = fs::read_to_string(work_dir.join(constants::DEFAULT_TSV_EXTRACT))?;
    assert_eq!(tsv.lines().next(), Some("p,q,r"));
    let merged = fs::read_to_string(work_dir.join(constants::DEFAULT_MERGED))?;
    assert!(merged.lines().all(|l| l.split(',').count() == 9));

    let consolidate = result.step(constants::CONSOLIDATE_DATA).expect("consolidate ran");
    assert_eq!(consolidate.result.as_ref().map(|r| r.processed_count), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_runs_are_deterministic() -> Result<()> {
    let temp_dir = tempdir()?;
    let work_dir = temp_dir.path();
    write_archive(
        &work_dir.join(constants::DEFAULT_ARCHIVE),
        &[
            ("vehicle-data.csv", VEHICLE_DATA),
            ("tollplaza-data.tsv", TOLLPLAZA_DATA),
            ("payment-data.txt", PAYMENT_DATA),
        ],
    )?;

    let orchestrator = PipelineOrchestrator::new(config_for(work_dir));
    let first = orchestrator.run_pipeline(&PipelineConfig::toll_data()).await?;
    let first_bytes = fs::read(work_dir.join(constants::DEFAULT_STAGED))?;
    let second = orchestrator.run_pipeline(&PipelineConfig::toll_data()).await?;
    let second_bytes = fs::read(work_dir.join(constants::DEFAULT_STAGED))?;

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first_bytes, second_bytes);
    assert!(first.staged_sha256.is_some());
    assert_eq!(first.staged_sha256, second.staged_sha256);
    Ok(())
}

#[tokio::test]
async fn test_mismatched_sources_fail_at_consolidate() -> Result<()> {
    let temp_dir = tempdir()?;
    let work_dir = temp_dir.path();
    write_archive(
        &work_dir.join(constants::DEFAULT_ARCHIVE),
        &[
            ("vehicle-data.csv", VEHICLE_DATA),
            ("tollplaza-data.tsv", "p\tq\tr\n"),
            ("payment-data.txt", PAYMENT_DATA),
        ],
    )?;

    let orchestrator = PipelineOrchestrator::new(config_for(work_dir));
    let result = orchestrator.run_pipeline(&PipelineConfig::toll_data()).await?;

    assert!(!result.success);
    let last = result.steps.last().expect("at least one step ran");
    assert_eq!(last.step_name, constants::CONSOLIDATE_DATA);
    assert!(last.error.as_deref().unwrap_or("").contains("Record count mismatch"));
    assert!(result.step(constants::TRANSFORM_DATA).is_none());
    assert!(!work_dir.join(constants::DEFAULT_MERGED).exists());
    assert!(!work_dir.join(constants::DEFAULT_STAGED).exists());
    assert!(result.staged_sha256.is_none());
    Ok(())
}

#[tokio::test]
async fn test_missing_archive_stops_at_first_step() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut config = config_for(temp_dir.path());
    config.retry.retries = 1;

    let orchestrator = PipelineOrchestrator::new(config);
    let result = orchestrator.run_pipeline(&PipelineConfig::toll_data()).await?;

    assert!(!result.success);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].step_name, constants::UNZIP_DATA);
    assert_eq!(result.steps[0].attempts, 2);
    assert!(result.error.as_deref().unwrap_or("").contains("Archive extraction failed"));
    Ok(())
}

#[tokio::test]
async fn test_single_step_invocation() -> Result<()> {
    let temp_dir = tempdir()?;
    let work_dir = temp_dir.path();
    fs::write(work_dir.join(constants::DEFAULT_PAYMENT_DATA), PAYMENT_DATA)?;

    let orchestrator = PipelineOrchestrator::new(config_for(work_dir));
    let result = orchestrator
        .run_step(PipelineStepConfig::ExtractDataFromFixedWidth)
        .await?;

    assert_eq!(result.processed_count, 2);
    assert_eq!(
        fs::read_to_string(work_dir.join(constants::DEFAULT_FIXED_WIDTH_EXTRACT))?,
        "1234567890,abcdefghij\nABCDEFGHIJ,klmnopqrst\n"
    );
    Ok(())
}
