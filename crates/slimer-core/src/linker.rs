//! Reusing a previously installed binary instead of downloading again.
//!
//! A recorded location is trusted only when its platform/arch equal the
//! current target, the file still exists, and the binary reports the expected
//! version. Any doubt resolves to `None` and the caller reinstalls.

use std::path::{Path, PathBuf};

use crate::location::{LocationRecord, LocationRecorder};
use crate::platform::PlatformTarget;
use crate::process::ProcessRunner;
use crate::version::probe_version;

pub struct Linker<R> {
    target: PlatformTarget,
    version: String,
    runner: R,
    recorder: LocationRecorder,
}

impl<R: ProcessRunner> Linker<R> {
    /// `recorder` is where a successful link is re-persisted; it may differ
    /// from the record being inspected (e.g. an older global install).
    pub fn new(target: PlatformTarget, version: impl Into<String>, runner: R, recorder: LocationRecorder) -> Self {
        Self {
            target,
            version: version.into(),
            runner,
            recorder,
        }
    }

    pub fn target(&self) -> &PlatformTarget {
        &self.target
    }

    /// Returns the verified binary path, or `None` for any kind of miss.
    pub async fn try_reuse_existing(&self, record_path: &Path) -> Option<PathBuf> {
        let record = match LocationRecord::load(record_path) {
            Ok(Some(r)) => r,
            Ok(None) => {
                tracing::debug!("no location record at {}", record_path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable location record: {:#}", e);
                return None;
            }
        };

        if !record.matches_target(&self.target) {
            tracing::info!(
                "location record {} is for {}/{}, need {}",
                record_path.display(),
                record.platform.as_deref().unwrap_or("?"),
                record.arch.as_deref().unwrap_or("?"),
                self.target
            );
            return None;
        }

        let candidate = record.resolve_against(record_path);
        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                tracing::info!("recorded location {} is not a file", candidate.display());
                return None;
            }
            Err(e) => {
                tracing::info!("recorded binary {} is gone: {}", candidate.display(), e);
                return None;
            }
        }

        if !probe_version(&self.runner, &candidate, &self.version).await.is_match() {
            return None;
        }

        if let Err(e) = self.recorder.record(&candidate, &self.target) {
            tracing::warn!("verified {} but could not record it: {:#}", candidate.display(), e);
            return None;
        }
        tracing::info!("SlimerJS linked at {}", candidate.display());
        Some(candidate)
    }
}
