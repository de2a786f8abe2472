//! Target platform detection.
//!
//! Names follow the Node.js `process.platform` / `process.arch` vocabulary,
//! which is what the release table and persisted records are keyed on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overrides the detected platform (cross-installs, tests).
pub const PLATFORM_ENV: &str = "SLIMERJS_PLATFORM";
/// Overrides the detected CPU architecture.
pub const ARCH_ENV: &str = "SLIMERJS_ARCH";

/// The (OS, CPU architecture) pair a binary must match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    pub platform: String,
    pub arch: String,
}

impl PlatformTarget {
    pub fn new(platform: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    /// Native OS/arch of the running process.
    pub fn host() -> Self {
        Self::new(
            host_platform(std::env::consts::OS),
            host_arch(std::env::consts::ARCH),
        )
    }

    pub fn is_windows(&self) -> bool {
        self.platform == "win32"
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform, self.arch)
    }
}

/// Resolves the target from `SLIMERJS_PLATFORM` / `SLIMERJS_ARCH`, falling back
/// to the host. Never fails.
pub fn resolve_platform() -> PlatformTarget {
    resolve_platform_with(|key| std::env::var(key).ok())
}

/// Like [`resolve_platform`] but reads overrides through `lookup`.
/// Empty override values are ignored.
pub fn resolve_platform_with<F>(lookup: F) -> PlatformTarget
where
    F: Fn(&str) -> Option<String>,
{
    let host = PlatformTarget::host();
    let pick = |key: &str, fallback: String| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
    };
    let target = PlatformTarget {
        platform: pick(PLATFORM_ENV, host.platform),
        arch: pick(ARCH_ENV, host.arch),
    };
    tracing::debug!("resolved target platform {}", target);
    target
}

fn host_platform(os: &str) -> String {
    match os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
    .to_string()
}

fn host_arch(arch: &str) -> String {
    match arch {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        other => other,
    }
    .to_string()
}
