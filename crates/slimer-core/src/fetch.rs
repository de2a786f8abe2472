//! Downloading the release archive over HTTP(S).
//!
//! Single GET with redirects (release hosts redirect to object storage),
//! written to a temp file next to the destination and renamed into place only
//! after the transfer completed.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// File-download seam. Implementations block; the installer runs them on a
/// blocking thread.
pub trait Fetcher {
    /// Downloads `url` to `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

#[derive(Debug, Clone, Copy)]
pub struct CurlFetcher {
    retry: RetryPolicy,
    connect_timeout: Duration,
}

impl CurlFetcher {
    pub fn new(retry: RetryPolicy, connect_timeout: Duration) -> Self {
        Self { retry, connect_timeout }
    }

    fn attempt(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut part = tempfile::NamedTempFile::new_in(dir)?;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.fail_on_error(false)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;

        let mut written = 0u64;
        let mut write_err: Option<std::io::Error> = None;
        let performed = {
            let file: &mut File = part.as_file_mut();
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            let result = transfer.perform();
            result
        };
        if let Some(e) = write_err.take() {
            return Err(FetchError::Io(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        if let Ok(expected) = easy.content_length_download() {
            if expected > 0.0 && (expected as u64) != written {
                return Err(FetchError::PartialTransfer {
                    expected: expected as u64,
                    received: written,
                });
            }
        }

        part.as_file_mut().sync_all()?;
        part.persist(dest).map_err(|e| FetchError::Io(e.error))?;
        Ok(written)
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        tracing::info!("downloading {} to {}", url, dest.display());
        let n = run_with_retry(&self.retry, |attempt| {
            tracing::debug!("GET {} (attempt {})", url, attempt);
            self.attempt(url, dest)
        })
        .with_context(|| format!("download {}", url))?;
        tracing::info!("downloaded {} bytes", n);
        Ok(n)
    }
}
