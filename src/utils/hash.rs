// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! SHA-256 helper utilities.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Raw 32-byte SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(Sha256::digest(data).as_slice());
    out
}

/// Compute the SHA-256 hash of a file and return its lowercase hex digest.
///
/// Used to show a fingerprint for documents opened from disk.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or fully read.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open file for hashing: {:?}", path))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read file for hashing: {:?}", path))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known-answer vector for the empty input.
    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_of_pin_is_stable() {
        assert_eq!(
            hex::encode(sha256(b"1234")),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn hash_file_matches_in_memory_digest() {
        use std::io::Write;

        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"{\"header\":{}}").unwrap();

        let digest = hash_file(tmp.path()).unwrap();
        assert_eq!(digest, hex::encode(sha256(b"{\"header\":{}}")));
    }

    #[test]
    fn hash_file_reports_missing_file() {
        let err = hash_file(Path::new("/definitely/not/here.pay")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file for hashing"));
    }
}
