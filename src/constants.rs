/// Step ids, in pipeline order. These are the names an external scheduler
/// passes to `tolldata_etl step <STEP_ID>`.
pub const UNZIP_DATA: &str = "unzip_data";
pub const EXTRACT_DATA_FROM_CSV: &str = "extract_data_from_csv";
pub const EXTRACT_DATA_FROM_TSV: &str = "extract_data_from_tsv";
pub const EXTRACT_DATA_FROM_FIXED_WIDTH: &str = "extract_data_from_fixed_width";
pub const CONSOLIDATE_DATA: &str = "consolidate_data";
pub const TRANSFORM_DATA: &str = "transform_data";

/// Get all step ids in execution order
pub fn get_step_ids() -> Vec<&'static str> {
    vec![
        UNZIP_DATA,
        EXTRACT_DATA_FROM_CSV,
        EXTRACT_DATA_FROM_TSV,
        EXTRACT_DATA_FROM_FIXED_WIDTH,
        CONSOLIDATE_DATA,
        TRANSFORM_DATA,
    ]
}

// Default file names inside the work directory
pub const DEFAULT_ARCHIVE: &str = "tolldata.tgz";
pub const DEFAULT_VEHICLE_DATA: &str = "vehicle-data.csv";
pub const DEFAULT_TOLLPLAZA_DATA: &str = "tollplaza-data.tsv";
pub const DEFAULT_PAYMENT_DATA: &str = "payment-data.txt";
pub const DEFAULT_CSV_EXTRACT: &str = "csv_data.csv";
pub const DEFAULT_TSV_EXTRACT: &str = "tsv_data.csv";
pub const DEFAULT_FIXED_WIDTH_EXTRACT: &str = "fixed_width_data.csv";
pub const DEFAULT_MERGED: &str = "extracted_data.csv";
pub const DEFAULT_STAGED: &str = "staging_data.csv";

/// Column of the merged record holding the vehicle type (1-indexed)
pub const VEHICLE_TYPE_COLUMN: usize = 4;

pub const CONFIG_ENV_VAR: &str = "TOLLDATA_ETL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "tolldata_etl.toml";
