//! Asking a candidate binary which version it is.

use std::path::Path;

use crate::process::{ProcessError, ProcessRunner};

/// Release this resolver installs and accepts.
pub const SLIMERJS_VERSION: &str = "0.10.3";

/// Outcome of `<binary> --version`.
#[derive(Debug)]
pub enum VersionCheck {
    Matches,
    Mismatch { output: String },
    /// The binary could not be run, timed out, or exited non-zero.
    Failed(ProcessError),
}

impl VersionCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, VersionCheck::Matches)
    }
}

/// True when `expected` occurs in `output` as a whole version token, so
/// `0.10.3` is found in `SlimerJS 0.10.3, Copyright ...` but not in `0.10.31`
/// or `10.10.3`.
pub fn output_reports_version(output: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let continues = |c: Option<char>, next: Option<char>| match c {
        Some(c) if c.is_ascii_alphanumeric() => true,
        Some('.' | '-' | '+') => next.map_or(false, |n| n.is_ascii_alphanumeric()),
        _ => false,
    };
    output.match_indices(expected).any(|(start, _)| {
        let before = output[..start].chars().next_back();
        let mut after = output[start + expected.len()..].chars();
        let (a1, a2) = (after.next(), after.next());
        let digit_before = matches!(before, Some(c) if c.is_ascii_digit() || c == '.');
        !digit_before && !continues(a1, a2)
    })
}

/// Runs `binary --version` and checks the output against `expected`.
pub async fn probe_version<R: ProcessRunner>(runner: &R, binary: &Path, expected: &str) -> VersionCheck {
    tracing::info!("found SlimerJS at {}, verifying", binary.display());
    match runner.run(binary, &["--version"]).await {
        Ok(out) => {
            if output_reports_version(&out.stdout, expected) {
                VersionCheck::Matches
            } else {
                tracing::warn!(
                    "SlimerJS detected at {} but wrong version: {}",
                    binary.display(),
                    out.stdout.trim()
                );
                VersionCheck::Mismatch { output: out.stdout }
            }
        }
        Err(e) => {
            tracing::warn!("error verifying SlimerJS at {}, continuing: {}", binary.display(), e);
            VersionCheck::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_version_in_banner() {
        assert!(output_reports_version("SlimerJS 0.10.3, Copyright 2012-2017 Laurent Jouanneau & Innophi\n", "0.10.3"));
        assert!(output_reports_version("0.10.3", "0.10.3"));
        assert!(output_reports_version("v0.10.3.", "0.10.3"));
        assert!(output_reports_version("Mozilla Firefox 52\nSlimerJS 0.10.3\n", "0.10.3"));
    }

    #[test]
    fn rejects_superstrings() {
        assert!(!output_reports_version("SlimerJS 0.10.31, Copyright", "0.10.3"));
        assert!(!output_reports_version("SlimerJS 10.10.3", "0.10.3"));
        assert!(!output_reports_version("SlimerJS 1.0.10.3", "0.10.3"));
        assert!(!output_reports_version("SlimerJS 0.10.3-beta", "0.10.3"));
        assert!(!output_reports_version("SlimerJS 0.10.3.1", "0.10.3"));
    }

    #[test]
    fn rejects_other_versions_and_empty() {
        assert!(!output_reports_version("SlimerJS 0.9.6, Copyright", "0.10.3"));
        assert!(!output_reports_version("", "0.10.3"));
        assert!(!output_reports_version("anything", ""));
    }
}
