//! Failures that end a resolution attempt.
//!
//! Everything recoverable (stale records, a cached archive that no longer
//! verifies, a binary reporting the wrong version) is logged and falls through
//! to the next strategy; only these reach the caller.

use std::path::PathBuf;

use crate::platform::PlatformTarget;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "no prebuilt SlimerJS for {target}; install it manually and point SLIMERJS_PLATFORM/SLIMERJS_ARCH or the location record at it"
    )]
    ManualInstallRequired { target: PlatformTarget },

    #[error("download failed: {0:#}")]
    Download(anyhow::Error),

    #[error("checksum mismatch for {url}: downloaded archive does not hash to {expected}")]
    ChecksumMismatch { url: String, expected: String },

    #[error("extraction failed: {0:#}")]
    Extract(anyhow::Error),

    #[error("could not record binary location: {0:#}")]
    Record(anyhow::Error),

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ResolveError::Io { action, path, source }
    }

    /// True when the user has to supply the binary themselves.
    pub fn needs_manual_install(&self) -> bool {
        matches!(self, ResolveError::ManualInstallRequired { .. })
    }
}
