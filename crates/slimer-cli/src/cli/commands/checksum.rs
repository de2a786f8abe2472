//! `slimer-install checksum <path> [--expected HEX]`

use anyhow::Result;
use slimer_core::checksum::{self, ChecksumCheck};
use std::path::Path;

/// Prints the SHA-256 of `path`, or checks it against `expected`.
pub fn run_checksum(path: &Path, expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        let digest = checksum::sha256_path(path)?;
        println!("{}  {}", digest, path.display());
        return Ok(());
    };
    match checksum::check_checksum(path, expected) {
        ChecksumCheck::Verified => {
            println!("{}: OK", path.display());
            Ok(())
        }
        ChecksumCheck::Mismatch { actual } => {
            anyhow::bail!("{}: checksum mismatch (got {})", path.display(), actual)
        }
        ChecksumCheck::Indeterminate(e) => Err(e),
    }
}
