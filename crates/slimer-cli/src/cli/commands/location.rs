//! `slimer-install location` – show the recorded binary.

use anyhow::Result;
use slimer_core::location::LOCATION_FILE;
use slimer_core::LocationRecord;
use std::path::Path;

use crate::cli::Context;

pub fn run_location(ctx: &Context, install_dir: Option<&Path>, json: bool) -> Result<()> {
    let record_path = ctx.install_dir(install_dir)?.join(LOCATION_FILE);
    let Some(record) = LocationRecord::load(&record_path)? else {
        anyhow::bail!("no location record at {}", record_path.display());
    };
    let binary = record.resolve_against(&record_path);
    if json {
        let out = serde_json::json!({
            "record": record_path,
            "location": binary,
            "platform": record.platform,
            "arch": record.arch,
            "exists": binary.is_file(),
            "matches_target": record.matches_target(&ctx.target),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", binary.display());
        if !record.matches_target(&ctx.target) {
            eprintln!(
                "warning: recorded for {}/{}, current target is {}",
                record.platform.as_deref().unwrap_or("?"),
                record.arch.as_deref().unwrap_or("?"),
                ctx.target
            );
        }
    }
    Ok(())
}
