//! End-to-end resolution: reuse a verified install, else download, verify,
//! extract and record.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::checksum::verify_checksum;
use crate::download_spec::{DownloadSpec, DownloadSpecSelector};
use crate::error::ResolveError;
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::linker::Linker;
use crate::location::LocationRecorder;
use crate::platform::PlatformTarget;
use crate::process::ProcessRunner;

/// Downloaded archives, kept so an interrupted install can resume cheaply.
pub const DOWNLOADS_DIR: &str = "downloads";
/// Where archives are unpacked.
pub const EXTRACT_DIR: &str = "slimer";

/// How the binary was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// An existing install verified and was reused.
    Linked(PathBuf),
    /// A fresh archive was downloaded (or a cached one reused) and unpacked.
    Installed(PathBuf),
}

impl InstallOutcome {
    pub fn path(&self) -> &Path {
        match self {
            InstallOutcome::Linked(p) | InstallOutcome::Installed(p) => p,
        }
    }
}

pub struct Installer<R, F, E> {
    target: PlatformTarget,
    version: String,
    cdn_url: String,
    install_dir: PathBuf,
    runner: R,
    fetcher: Arc<F>,
    extractor: E,
}

impl<R, F, E> Installer<R, F, E>
where
    R: ProcessRunner,
    F: Fetcher + Send + Sync + 'static,
    E: Extractor,
{
    pub fn new(
        target: PlatformTarget,
        version: impl Into<String>,
        cdn_url: impl Into<String>,
        install_dir: impl Into<PathBuf>,
        runner: R,
        fetcher: F,
        extractor: E,
    ) -> Self {
        Self {
            target,
            version: version.into(),
            cdn_url: cdn_url.into(),
            install_dir: install_dir.into(),
            runner,
            fetcher: Arc::new(fetcher),
            extractor,
        }
    }

    pub fn recorder(&self) -> LocationRecorder {
        LocationRecorder::in_dir(&self.install_dir)
    }

    /// Spec for this installer's target, `None` when no prebuilt archive
    /// exists. Fails only when the CDN root is not a usable base URL.
    pub fn download_spec(&self) -> Result<Option<DownloadSpec>, ResolveError> {
        let selector = DownloadSpecSelector::new(&self.cdn_url).map_err(ResolveError::Download)?;
        Ok(selector.select(&self.target, &self.version))
    }

    /// Tries this install dir's own record, then each of `extra_records`
    /// (e.g. a previous global install), then a fresh install.
    pub async fn resolve(&self, extra_records: &[PathBuf]) -> Result<InstallOutcome, ResolveError> {
        if let Some(path) = self.try_link(extra_records).await {
            return Ok(InstallOutcome::Linked(path));
        }
        let spec = self
            .download_spec()?
            .ok_or_else(|| ResolveError::ManualInstallRequired {
                target: self.target.clone(),
            })?;
        self.install_from_spec(&spec).await.map(InstallOutcome::Installed)
    }

    async fn try_link(&self, extra_records: &[PathBuf]) -> Option<PathBuf> {
        let recorder = self.recorder();
        let own = recorder.record_path().to_path_buf();
        let linker = Linker::new(self.target.clone(), self.version.clone(), &self.runner, recorder);
        for record in std::iter::once(&own).chain(extra_records) {
            if let Some(path) = linker.try_reuse_existing(record).await {
                return Some(path);
            }
        }
        None
    }

    /// Fetches (unless a verified copy is cached), verifies, extracts and
    /// records the archive described by `spec`. Returns the binary path.
    pub async fn install_from_spec(&self, spec: &DownloadSpec) -> Result<PathBuf, ResolveError> {
        let archive = self.ensure_archive(spec).await?;

        let dest = self.install_dir.join(EXTRACT_DIR);
        if tokio::fs::metadata(&dest).await.is_ok() {
            tokio::fs::remove_dir_all(&dest)
                .await
                .map_err(ResolveError::io("remove old install", &dest))?;
        }
        tokio::fs::create_dir_all(&dest)
            .await
            .map_err(ResolveError::io("create", &dest))?;
        let binary = self
            .extractor
            .extract(&archive, &dest)
            .await
            .map_err(ResolveError::Extract)?;

        self.recorder()
            .record(&binary, &self.target)
            .map_err(ResolveError::Record)?;
        tracing::info!("SlimerJS installed at {}", binary.display());
        Ok(binary)
    }

    /// Path of the downloaded archive for `spec`.
    pub fn archive_path(&self, spec: &DownloadSpec) -> PathBuf {
        let name = url::Url::parse(&spec.url)
            .ok()
            .and_then(|u| u.path_segments().and_then(|s| s.last().map(str::to_string)))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "slimerjs-archive".to_string());
        self.install_dir.join(DOWNLOADS_DIR).join(name)
    }

    async fn ensure_archive(&self, spec: &DownloadSpec) -> Result<PathBuf, ResolveError> {
        let archive = self.archive_path(spec);
        if archive.is_file() {
            if verify_checksum(&archive, &spec.checksum) {
                tracing::info!("reusing previously downloaded {}", archive.display());
                return Ok(archive);
            }
            tracing::info!("discarding stale download {}", archive.display());
        }

        let downloads = self.install_dir.join(DOWNLOADS_DIR);
        tokio::fs::create_dir_all(&downloads)
            .await
            .map_err(ResolveError::io("create", &downloads))?;

        let fetcher = Arc::clone(&self.fetcher);
        let url = spec.url.clone();
        let dest = archive.clone();
        tokio::task::spawn_blocking(move || fetcher.fetch(&url, &dest))
            .await
            .map_err(|e| ResolveError::Download(anyhow::Error::new(e)))?
            .map_err(ResolveError::Download)?;

        if !verify_checksum(&archive, &spec.checksum) {
            if let Err(e) = std::fs::remove_file(&archive) {
                tracing::warn!("could not remove bad download {}: {}", archive.display(), e);
            }
            return Err(ResolveError::ChecksumMismatch {
                url: spec.url.clone(),
                expected: spec.checksum.clone(),
            });
        }
        Ok(archive)
    }
}
