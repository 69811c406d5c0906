use crate::error::{EtlError, Result};
use crate::pipeline::processing::records::{self, BlankLines, COMMA};
use std::path::Path;
use tracing::info;

/// Uppercase one column (1-indexed) of a comma-delimited file.
///
/// Only ASCII letters change; every other column is copied unchanged.
pub fn uppercase_column(input: &Path, output: &Path, column: usize) -> Result<usize> {
    if column == 0 {
        return Err(EtlError::Config("transform column is 1-indexed".to_string()));
    }
    let rows = records::open_records(input, COMMA, BlankLines::Skip)?;

    let written = records::write_records(output, |writer| {
        for record in rows {
            let record = record?;
            if record.len() < column {
                return Err(EtlError::MalformedRecord {
                    path: input.to_path_buf(),
                    line: records::line_of(&record),
                    expected: column,
                    found: record.len(),
                });
            }

            let target = record[column - 1].to_ascii_uppercase();
            writer.write(record.iter().enumerate().map(|(i, field)| {
                if i == column - 1 {
                    target.as_str()
                } else {
                    field
                }
            }))?;
        }
        Ok(writer.written())
    })?;

    info!(
        "Uppercased column {} of {} into {} ({} records)",
        column,
        input.display(),
        output.display(),
        written
    );
    Ok(written)
}
