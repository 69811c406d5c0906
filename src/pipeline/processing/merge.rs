use crate::error::{EtlError, Result};
use crate::pipeline::processing::records::{self, BlankLines, COMMA};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Join comma-delimited extracts side by side, one output record per input row.
///
/// Rows are aligned by position. Inputs with differing record counts are
/// rejected instead of being truncated to the shortest.
pub fn merge_records(inputs: &[PathBuf], output: &Path) -> Result<usize> {
    let mut extracts = Vec::with_capacity(inputs.len());
    for input in inputs {
        extracts.push(records::read_all(input, COMMA, BlankLines::Keep)?);
    }

    let expected = extracts.first().map(Vec::len).unwrap_or(0);
    if extracts.iter().any(|rows| rows.len() != expected) {
        return Err(EtlError::RecordCountMismatch {
            counts: inputs
                .iter()
                .cloned()
                .zip(extracts.iter().map(Vec::len))
                .collect(),
        });
    }
    debug!("Merging {} inputs of {} records each", inputs.len(), expected);

    let written = records::write_records(output, |writer| {
        for row in 0..expected {
            writer.write(extracts.iter().flat_map(|rows| rows[row].iter()))?;
        }
        Ok(writer.written())
    })?;

    info!(
        "Consolidated {} extracts into {} ({} records)",
        inputs.len(),
        output.display(),
        written
    );
    Ok(written)
}
