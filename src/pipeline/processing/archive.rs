use crate::error::{EtlError, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Unpack a tar archive (optionally gzip-compressed) into `dest`.
///
/// Existing files with the same names are overwritten. After unpacking,
/// every path in `expected` (relative to `dest`) must exist as a file.
pub fn unpack_archive(archive: &Path, dest: &Path, expected: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)
        .map_err(|e| EtlError::extraction(archive, format!("cannot open archive: {e}")))?;
    let mut reader = BufReader::new(file);

    let compressed = reader
        .fill_buf()
        .map(|head| head.starts_with(&GZIP_MAGIC))
        .map_err(|e| EtlError::extraction(archive, format!("cannot read archive: {e}")))?;
    debug!("Archive {} gzip-compressed: {}", archive.display(), compressed);

    let stream: Box<dyn Read> = if compressed {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };

    fs::create_dir_all(dest).map_err(|e| EtlError::io(dest, e))?;

    let mut tarball = tar::Archive::new(stream);
    tarball.set_overwrite(true);
    tarball
        .unpack(dest)
        .map_err(|e| EtlError::extraction(archive, format!("corrupt or unreadable archive: {e}")))?;

    let mut members = Vec::with_capacity(expected.len());
    for member in expected {
        let path = dest.join(member);
        if !path.is_file() {
            return Err(EtlError::extraction(
                archive,
                format!("expected member '{}' not found", member.display()),
            ));
        }
        members.push(path);
    }

    info!(
        "Unpacked {} into {} ({} expected members present)",
        archive.display(),
        dest.display(),
        members.len()
    );
    Ok(members)
}
