use crate::error::{EtlError, Result};
use crate::pipeline::processing::records::{self, BlankLines};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Ordered, 1-indexed column positions to keep from each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct ColumnSelection(Vec<usize>);

impl TryFrom<Vec<usize>> for ColumnSelection {
    type Error = EtlError;

    fn try_from(positions: Vec<usize>) -> Result<Self> {
        Self::new(positions)
    }
}

impl From<ColumnSelection> for Vec<usize> {
    fn from(selection: ColumnSelection) -> Self {
        selection.0
    }
}

impl ColumnSelection {
    pub fn new(positions: Vec<usize>) -> Result<Self> {
        if positions.is_empty() {
            return Err(EtlError::Config("column selection must not be empty".to_string()));
        }
        if positions.contains(&0) {
            return Err(EtlError::Config("column positions are 1-indexed".to_string()));
        }
        Ok(Self(positions))
    }

    /// Built-in selections that are known to be valid.
    pub(crate) fn from_static(positions: &[usize]) -> Self {
        Self(positions.to_vec())
    }

    pub fn positions(&self) -> &[usize] {
        &self.0
    }

    /// Highest position a record must reach for the selection to apply.
    pub fn required_width(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Pick the selected fields in order, or `None` if the record is too short.
    pub fn select<'r>(&self, record: &'r StringRecord) -> Option<Vec<&'r str>> {
        self.0.iter().map(|&pos| record.get(pos - 1)).collect()
    }
}

/// Keep the selected columns of a delimited file and write them comma-delimited.
///
/// Returns the number of records written.
pub fn extract_columns(
    input: &Path,
    output: &Path,
    delimiter: u8,
    selection: &ColumnSelection,
) -> Result<usize> {
    let rows = records::open_records(input, delimiter, BlankLines::Skip)?;

    let written = records::write_records(output, |writer| {
        for record in rows {
            let record = record?;
            let fields = selection
                .select(&record)
                .ok_or_else(|| EtlError::MalformedRecord {
                    path: input.to_path_buf(),
                    line: records::line_of(&record),
                    expected: selection.required_width(),
                    found: record.len(),
                })?;
            writer.write(fields)?;
        }
        Ok(writer.written())
    })?;

    info!(
        "Extracted columns {:?} from {} into {} ({} records)",
        selection.positions(),
        input.display(),
        output.display(),
        written
    );
    Ok(written)
}
