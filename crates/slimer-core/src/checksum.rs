//! SHA-256 verification of downloaded archives.
//!
//! [`check_checksum`] keeps the outcome three-way so logs can tell a real
//! mismatch from a file we could not read; [`verify_checksum`] collapses it to
//! the boolean callers act on.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Outcome of comparing a file against an expected digest.
#[derive(Debug)]
pub enum ChecksumCheck {
    Verified,
    Mismatch { actual: String },
    /// The file could not be hashed; nothing is known about its content.
    Indeterminate(anyhow::Error),
}

/// Hashes `path` and compares against `expected` (hex, any case, surrounding
/// whitespace ignored).
pub fn check_checksum(path: &Path, expected: &str) -> ChecksumCheck {
    match sha256_path(path) {
        Ok(actual) => {
            if actual == expected.trim().to_ascii_lowercase() {
                ChecksumCheck::Verified
            } else {
                ChecksumCheck::Mismatch { actual }
            }
        }
        Err(e) => ChecksumCheck::Indeterminate(e),
    }
}

/// True only when the file hashes to `expected`. Never errors: unreadable
/// files count as not verified.
pub fn verify_checksum(path: &Path, expected: &str) -> bool {
    match check_checksum(path, expected) {
        ChecksumCheck::Verified => {
            tracing::info!("verified checksum of {}", path.display());
            true
        }
        ChecksumCheck::Mismatch { actual } => {
            tracing::warn!(
                "checksum mismatch for {}: expected {}, got {}",
                path.display(),
                expected,
                actual
            );
            false
        }
        ChecksumCheck::Indeterminate(e) => {
            tracing::error!("failed to verify checksum of {}: {:#}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    fn hello_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            sha256_path(f.path()).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let f = hello_file();
        assert_eq!(sha256_path(f.path()).unwrap(), HELLO_SHA);
    }

    #[test]
    fn verify_accepts_correct_digest_in_any_case() {
        let f = hello_file();
        assert!(verify_checksum(f.path(), HELLO_SHA));
        assert!(verify_checksum(f.path(), &HELLO_SHA.to_ascii_uppercase()));
        assert!(verify_checksum(f.path(), &format!(" {}\n", HELLO_SHA)));
    }

    #[test]
    fn verify_rejects_wrong_digest() {
        let f = hello_file();
        assert!(!verify_checksum(f.path(), "blargh"));
        match check_checksum(f.path(), "blargh") {
            ChecksumCheck::Mismatch { actual } => assert_eq!(actual, HELLO_SHA),
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_indeterminate_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.tar.bz2");
        assert!(!verify_checksum(&missing, HELLO_SHA));
        assert!(matches!(
            check_checksum(&missing, HELLO_SHA),
            ChecksumCheck::Indeterminate(_)
        ));
    }
}
