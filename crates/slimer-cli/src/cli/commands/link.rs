//! `slimer-install link <record>` – reuse a binary named by a location record.

use anyhow::Result;
use slimer_core::linker::Linker;
use slimer_core::process::SystemRunner;
use slimer_core::{LocationRecorder, SLIMERJS_VERSION};
use std::path::Path;

use crate::cli::Context;

pub async fn run_link(ctx: &Context, record: &Path, install_dir: Option<&Path>) -> Result<()> {
    let install_dir = ctx.install_dir(install_dir)?;
    let linker = Linker::new(
        ctx.target.clone(),
        SLIMERJS_VERSION,
        SystemRunner::new(ctx.cfg.version_timeout()),
        LocationRecorder::in_dir(&install_dir),
    );
    match linker.try_reuse_existing(record).await {
        Some(path) => {
            println!("SlimerJS linked at {}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "no reusable SlimerJS {} for {} via {}",
            SLIMERJS_VERSION,
            ctx.target,
            record.display()
        ),
    }
}
