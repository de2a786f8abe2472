//! CLI command handlers, one per file.

mod checksum;
mod completions;
mod install;
mod link;
mod location;
mod platform;
mod spec;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use install::run_install;
pub use link::run_link;
pub use location::run_location;
pub use platform::run_platform;
pub use spec::run_spec;
