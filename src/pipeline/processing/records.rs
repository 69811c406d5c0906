//! Reading and writing delimited record files.
//!
//! Quoting is disabled in both directions so separators are literal, the
//! same way `cut` and `paste` treat them. Records end at `\n` (a trailing
//! `\r` is dropped). Blank lines in source files are not records; in the
//! extracts this crate writes, a blank line is a record with one empty field.

use crate::error::{EtlError, Result};
use csv::{Position, QuoteStyle, StringRecord, Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COMMA: u8 = b',';
pub const TAB: u8 = b'\t';

/// What a reader does with lines that are empty once the terminator is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankLines {
    Skip,
    Keep,
}

/// Lines of a text file paired with their 1-indexed line numbers.
///
/// Every stage splits its input here, so the delimited and fixed-width
/// readers agree on where records start and end.
pub fn numbered_lines(
    path: &Path,
    blank_lines: BlankLines,
) -> Result<impl Iterator<Item = Result<(u64, String)>>> {
    let file = File::open(path).map_err(|e| EtlError::io(path, e))?;
    let path = path.to_path_buf();
    Ok(BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(move |(index, line)| match line {
            Ok(mut line) => {
                if line.ends_with('\r') {
                    line.pop();
                }
                let keep = blank_lines == BlankLines::Keep || !line.is_empty();
                keep.then(|| Ok((index as u64 + 1, line)))
            }
            Err(e) => Some(Err(EtlError::io(&path, e))),
        }))
}

/// Open a delimited file for record-at-a-time reading.
///
/// Each record carries the physical line it came from, see [`line_of`].
pub fn open_records(
    path: &Path,
    delimiter: u8,
    blank_lines: BlankLines,
) -> Result<impl Iterator<Item = Result<StringRecord>>> {
    let delimiter = char::from(delimiter);
    Ok(numbered_lines(path, blank_lines)?.map(move |line| {
        let (number, line) = line?;
        let mut record = StringRecord::from(line.split(delimiter).collect::<Vec<_>>());
        let mut position = Position::new();
        position.set_line(number);
        record.set_position(Some(position));
        Ok(record)
    }))
}

/// Read every record of a delimited file into memory.
pub fn read_all(
    path: &Path,
    delimiter: u8,
    blank_lines: BlankLines,
) -> Result<Vec<StringRecord>> {
    let records = open_records(path, delimiter, blank_lines)?.collect::<Result<Vec<_>>>()?;
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// 1-indexed line number of a record read from a file.
pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Path of the in-progress file that backs `path` until it is committed.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write comma-delimited records to `path`.
///
/// Records go to a `.partial` sibling first and are renamed into place only
/// when `body` succeeds, so a failed stage never leaves output at `path`.
pub fn write_records<T>(
    path: &Path,
    body: impl FnOnce(&mut RecordWriter) -> Result<T>,
) -> Result<T> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
    }

    let temp = partial_path(path);
    let file = File::create(&temp).map_err(|e| EtlError::io(&temp, e))?;
    let raw = file.try_clone().map_err(|e| EtlError::io(&temp, e))?;
    let mut writer = RecordWriter {
        inner: WriterBuilder::new()
            .delimiter(COMMA)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file),
        raw,
        path: temp.clone(),
        written: 0,
    };

    let outcome = body(&mut writer).and_then(|value| {
        writer.flush()?;
        Ok(value)
    });
    drop(writer);

    match outcome {
        Ok(value) => {
            fs::rename(&temp, path).map_err(|e| EtlError::io(path, e))?;
            Ok(value)
        }
        Err(e) => {
            let _ = fs::remove_file(&temp);
            Err(e)
        }
    }
}

/// Comma-delimited writer handed to `write_records` bodies.
pub struct RecordWriter {
    inner: csv::Writer<File>,
    // Shares the file offset with `inner`; used for records the csv writer
    // would quote.
    raw: File,
    path: PathBuf,
    written: usize,
}

impl RecordWriter {
    pub fn write<I, F>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let fields: Vec<F> = fields.into_iter().collect();
        if fields.iter().all(|f| f.as_ref().is_empty()) && fields.len() <= 1 {
            // csv writes a lone empty field as `""`, which reads back as data
            self.flush()?;
            self.raw
                .write_all(b"\n")
                .map_err(|e| EtlError::io(&self.path, e))?;
        } else {
            self.inner
                .write_record(&fields)
                .map_err(|e| EtlError::csv(&self.path, e))?;
        }
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| EtlError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_all_skips_blank_lines_and_keeps_line_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "a,b\n\nc,d\n").unwrap();

        let records = read_all(&path, COMMA, BlankLines::Skip).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][0], "c");
        assert_eq!(line_of(&records[1]), 3);
    }

    #[test]
    fn test_records_end_at_newline_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "1,2,3,car\r5\n6,7\r\n\r\n8,9").unwrap();

        let records = read_all(&path, COMMA, BlankLines::Skip).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].len(), 4);
        assert_eq!(&records[0][3], "car\r5");
        assert_eq!(&records[1][1], "7");
        assert_eq!(line_of(&records[2]), 4);
    }

    #[test]
    fn test_kept_blank_line_is_one_empty_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("csv_data.csv");
        fs::write(&path, "a\n\nb\n").unwrap();

        let records = read_all(&path, COMMA, BlankLines::Keep).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].len(), 1);
        assert_eq!(&records[1][0], "");
    }

    #[test]
    fn test_quotes_are_literal() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        fs::write(&input, "\"x,y\",z\n").unwrap();

        let records = read_all(&input, COMMA, BlankLines::Skip).unwrap();
        assert_eq!(&records[0][0], "\"x");
        assert_eq!(&records[0][1], "y\"");

        write_records(&output, |w| w.write(records[0].iter())).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "\"x,y\",z\n");
    }

    #[test]
    fn test_single_empty_field_writes_empty_line() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");

        let written = write_records(&output, |w| {
            w.write(["a", "b"])?;
            w.write([""])?;
            w.write(["", ""])?;
            w.write(["c"])?;
            Ok(w.written())
        })
        .unwrap();

        assert_eq!(written, 4);
        assert_eq!(fs::read_to_string(&output).unwrap(), "a,b\n\n,\nc\n");
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");

        let result: Result<()> = write_records(&output, |w| {
            w.write(["a", "b"])?;
            Err(EtlError::Config("boom".to_string()))
        });

        assert!(result.is_err());
        assert!(!output.exists());
        assert!(!partial_path(&output).exists());
    }

    #[test]
    fn test_partial_path_is_sibling() {
        let p = partial_path(Path::new("/tmp/work/csv_data.csv"));
        assert_eq!(p, PathBuf::from("/tmp/work/csv_data.csv.partial"));
    }
}
