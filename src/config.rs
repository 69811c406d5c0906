use crate::constants;
use crate::error::{EtlError, Result};
use crate::pipeline::processing::{CharRange, ColumnSelection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub extract: ExtractConfig,
    pub transform: TransformConfig,
    pub retry: RetryConfig,
    pub notify: NotifyConfig,
    pub logging: LoggingConfig,
}

/// File locations. Relative paths resolve against `work_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub work_dir: PathBuf,
    pub archive: PathBuf,
    pub vehicle_data: PathBuf,
    pub tollplaza_data: PathBuf,
    pub payment_data: PathBuf,
    pub csv_extract: PathBuf,
    pub tsv_extract: PathBuf,
    pub fixed_width_extract: PathBuf,
    pub merged: PathBuf,
    pub staged: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("data"),
            archive: PathBuf::from(constants::DEFAULT_ARCHIVE),
            vehicle_data: PathBuf::from(constants::DEFAULT_VEHICLE_DATA),
            tollplaza_data: PathBuf::from(constants::DEFAULT_TOLLPLAZA_DATA),
            payment_data: PathBuf::from(constants::DEFAULT_PAYMENT_DATA),
            csv_extract: PathBuf::from(constants::DEFAULT_CSV_EXTRACT),
            tsv_extract: PathBuf::from(constants::DEFAULT_TSV_EXTRACT),
            fixed_width_extract: PathBuf::from(constants::DEFAULT_FIXED_WIDTH_EXTRACT),
            merged: PathBuf::from(constants::DEFAULT_MERGED),
            staged: PathBuf::from(constants::DEFAULT_STAGED),
        }
    }
}

impl PathsConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    /// Source files the archive must contain.
    pub fn archive_members(&self) -> Vec<PathBuf> {
        vec![
            self.vehicle_data.clone(),
            self.tollplaza_data.clone(),
            self.payment_data.clone(),
        ]
    }
}

/// Which columns and character ranges each extractor keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub csv_columns: ColumnSelection,
    pub tsv_columns: ColumnSelection,
    pub fixed_width_ranges: Vec<CharRange>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            csv_columns: ColumnSelection::from_static(&[1, 2, 3, 4]),
            tsv_columns: ColumnSelection::from_static(&[1, 2, 3]),
            fixed_width_ranges: vec![
                CharRange { start: 1, end: 10 },
                CharRange { start: 11, end: 20 },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// 1-indexed column of the merged record to uppercase
    pub column: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            column: constants::VEHICLE_TYPE_COLUMN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub retries: u32,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 1,
            delay: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub email: Option<String>,
    pub on_failure: bool,
    pub on_retry: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            email: None,
            on_failure: true,
            on_retry: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `TOLLDATA_ETL_CONFIG`, or from
    /// `tolldata_etl.toml` in the current directory.
    ///
    /// An explicitly named file must exist; the implicit default file may be
    /// absent, in which case built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(constants::CONFIG_ENV_VAR).map(PathBuf::from));

        let config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No config file found, using defaults");
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extract.fixed_width_ranges.is_empty() {
            return Err(EtlError::Config(
                "extract.fixed_width_ranges must not be empty".to_string(),
            ));
        }
        for range in &self.extract.fixed_width_ranges {
            CharRange::new(range.start, range.end)?;
        }
        if self.transform.column == 0 {
            return Err(EtlError::Config(
                "transform.column is 1-indexed".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EtlError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_layout() {
        let config = Config::default();
        assert_eq!(config.extract.csv_columns.positions(), &[1, 2, 3, 4]);
        assert_eq!(config.extract.tsv_columns.positions(), &[1, 2, 3]);
        assert_eq!(config.extract.fixed_width_ranges.len(), 2);
        assert_eq!(config.transform.column, 4);
        assert_eq!(config.retry.retries, 1);
        assert_eq!(config.retry.delay, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [paths]
            work_dir = "/srv/tolldata"

            [retry]
            retries = 3
            delay = "30s"

            [notify]
            email = "ops@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.work_dir, PathBuf::from("/srv/tolldata"));
        assert_eq!(config.paths.staged, PathBuf::from("staging_data.csv"));
        assert_eq!(config.retry.retries, 3);
        assert_eq!(config.retry.delay, Duration::from_secs(30));
        assert_eq!(config.notify.email.as_deref(), Some("ops@example.com"));
        assert!(config.notify.on_failure);
    }

    #[test]
    fn test_column_selection_validated_on_load() {
        let parsed: std::result::Result<Config, _> = toml::from_str(
            r#"
            [extract]
            csv_columns = [0, 1]
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let config: Config = toml::from_str(
            r#"
            [extract]
            fixed_width_ranges = [{ start = 10, end = 5 }]
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let paths = PathsConfig {
            work_dir: PathBuf::from("/work"),
            ..PathsConfig::default()
        };
        assert_eq!(
            paths.resolve(Path::new("csv_data.csv")),
            PathBuf::from("/work/csv_data.csv")
        );
        assert_eq!(
            paths.resolve(Path::new("/elsewhere/x.csv")),
            PathBuf::from("/elsewhere/x.csv")
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.extract.csv_columns, Config::default().extract.csv_columns);
    }
}
