pub mod config;
pub mod logging;

pub mod checksum;
pub mod download_spec;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod install;
pub mod linker;
pub mod location;
pub mod platform;
pub mod process;
pub mod retry;
pub mod version;

pub use download_spec::{DownloadSpec, DownloadSpecSelector};
pub use error::ResolveError;
pub use install::{InstallOutcome, Installer};
pub use location::{LocationRecord, LocationRecorder};
pub use platform::{resolve_platform, PlatformTarget};
pub use version::SLIMERJS_VERSION;
