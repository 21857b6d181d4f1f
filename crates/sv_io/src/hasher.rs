//! crates/sv_io/src/hasher.rs
//!
//! SHA-256 fingerprints of the exact bytes that were validated, so a report
//! can be tied to one submission file and one ground-truth snapshot.
//! Hex digests are **lowercase**.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{IoError, IoResult};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over a reader stream.
pub fn sha256_stream<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 256 * 1024]; // 256 KiB buffer
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 over a file's raw bytes.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let f = File::open(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    let mut r = BufReader::new(f);
    sha256_stream(&mut r).map_err(|source| IoError::Read { path: path.to_path_buf(), source })
}
