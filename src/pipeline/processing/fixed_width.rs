use crate::error::{EtlError, Result};
use crate::pipeline::processing::records::{self, BlankLines};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 1-indexed, inclusive character range `[start, end]` of a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start == 0 || end < start {
            return Err(EtlError::Config(format!(
                "invalid character range {}-{}: ranges are 1-indexed with start <= end",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Slice this range out of `line`, counting characters rather than bytes.
    pub fn slice<'l>(&self, line: &'l str) -> Option<&'l str> {
        let mut boundaries = line
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(line.len()));
        let from = boundaries.nth(self.start - 1)?;
        let to = boundaries.nth(self.end - self.start)?;
        Some(&line[from..to])
    }
}

/// Characters a line must have for every range to apply.
pub fn required_width(ranges: &[CharRange]) -> usize {
    ranges.iter().map(|r| r.end).max().unwrap_or(0)
}

/// Slice the configured ranges out of each line and write them comma-delimited.
///
/// Returns the number of records written.
pub fn extract_ranges(input: &Path, output: &Path, ranges: &[CharRange]) -> Result<usize> {
    let lines = records::numbered_lines(input, BlankLines::Skip)?;
    let required = required_width(ranges);

    let written = records::write_records(output, |writer| {
        for line in lines {
            let (number, line) = line?;
            let fields: Option<Vec<&str>> = ranges.iter().map(|r| r.slice(&line)).collect();
            let fields = fields.ok_or_else(|| EtlError::TruncatedRecord {
                path: input.to_path_buf(),
                line: number,
                required,
                found: line.chars().count(),
            })?;
            writer.write(fields)?;
        }
        Ok(writer.written())
    })?;

    info!(
        "Extracted {} fixed-width fields from {} into {} ({} records)",
        ranges.len(),
        input.display(),
        output.display(),
        written
    );
    Ok(written)
}
