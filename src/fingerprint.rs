use crate::error::{EtlError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Hex SHA-256 of a file's contents, used to compare staged outputs across runs.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| EtlError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| EtlError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}
