//! Record-level transforms used by the pipeline steps. Each function reads
//! its input files, writes exactly one output, and knows nothing about
//! step ordering or retries.

pub mod archive;
pub mod columns;
pub mod fixed_width;
pub mod merge;
pub mod records;
pub mod transform;

pub use archive::unpack_archive;
pub use columns::{extract_columns, ColumnSelection};
pub use fixed_width::{extract_ranges, CharRange};
pub use merge::merge_records;
pub use transform::uppercase_column;
