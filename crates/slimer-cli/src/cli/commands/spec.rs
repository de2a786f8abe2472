//! `slimer-install spec` – show what would be downloaded.

use anyhow::Result;
use slimer_core::SLIMERJS_VERSION;

use crate::cli::Context;

pub fn run_spec(ctx: &Context, json: bool) -> Result<()> {
    let selector = ctx.selector()?;
    let Some(spec) = selector.select(&ctx.target, SLIMERJS_VERSION) else {
        anyhow::bail!(
            "no prebuilt SlimerJS {} for {}; it has to be installed manually",
            SLIMERJS_VERSION,
            ctx.target
        );
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&spec)?);
    } else {
        println!("url:      {}", spec.url);
        println!("sha256:   {}", spec.checksum);
    }
    Ok(())
}
