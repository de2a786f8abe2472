//! `slimer-install install` – reuse or download the binary for this platform.

use anyhow::Result;
use slimer_core::extract::TarExtractor;
use slimer_core::fetch::CurlFetcher;
use slimer_core::process::SystemRunner;
use slimer_core::retry::RetryPolicy;
use slimer_core::{InstallOutcome, Installer, SLIMERJS_VERSION};
use std::path::{Path, PathBuf};

use crate::cli::Context;

pub async fn run_install(ctx: &Context, install_dir: Option<&Path>, records: &[PathBuf]) -> Result<()> {
    let install_dir = ctx.install_dir(install_dir)?;
    let retry = RetryPolicy::from_config(&ctx.cfg.retry_config());
    let installer = Installer::new(
        ctx.target.clone(),
        SLIMERJS_VERSION,
        ctx.cdn_url(),
        &install_dir,
        SystemRunner::new(ctx.cfg.version_timeout()),
        CurlFetcher::new(retry, ctx.cfg.connect_timeout()),
        TarExtractor::new(SystemRunner::new(ctx.cfg.extract_timeout()), ctx.target.clone()),
    );

    match installer.download_spec() {
        Ok(Some(spec)) => tracing::debug!("download spec for {}: {}", ctx.target, spec.url),
        Ok(None) => tracing::debug!("no prebuilt archive for {}", ctx.target),
        Err(e) => tracing::warn!("{:#}; only an existing install can be linked", e),
    }

    match installer.resolve(records).await? {
        InstallOutcome::Linked(path) => println!("SlimerJS linked at {}", path.display()),
        InstallOutcome::Installed(path) => println!("Done. SlimerJS binary available at {}", path.display()),
    }
    Ok(())
}
