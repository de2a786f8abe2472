//! `slimer-install platform`

use crate::cli::Context;

pub fn run_platform(ctx: &Context) {
    println!("platform: {}", ctx.target.platform);
    println!("arch:     {}", ctx.target.arch);
}
