//! Maps a target platform to the prebuilt release archive and its pinned checksum.
//!
//! Checksums are literal constants per release so a tampered CDN cannot change
//! what we accept.

use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

use crate::platform::PlatformTarget;

/// Default release host for the prebuilt archives.
pub const DEFAULT_CDN_URL: &str = "https://github.com/graingert/slimer-downloads/releases/download/";

/// Package-manager scoped CDN override (set by `npm install --slimerjs_cdnurl=...`).
pub const NPM_CDN_ENV: &str = "npm_config_slimerjs_cdnurl";
/// Plain CDN override.
pub const CDN_ENV: &str = "SLIMERJS_CDNURL";
/// Names the PhantomJS-derived installer read; still honored after the two above.
pub const LEGACY_NPM_CDN_ENV: &str = "npm_config_phantomjs_cdnurl";
pub const LEGACY_CDN_ENV: &str = "PHANTOMJS_CDNURL";

const CDN_ENV_ORDER: [&str; 4] = [NPM_CDN_ENV, CDN_ENV, LEGACY_NPM_CDN_ENV, LEGACY_CDN_ENV];

/// Where to fetch the archive for one target and the SHA-256 it must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadSpec {
    pub url: String,
    /// Lowercase hex SHA-256.
    pub checksum: String,
}

struct Release {
    suffix: &'static str,
    checksum: &'static str,
}

const LINUX_X64: Release = Release {
    suffix: "linux-x86_64.tar.bz2",
    checksum: "14e707c838e85f8131fb59b8cc38b5d81b4d45c194db7432e97ff331c913b89d",
};
const LINUX_IA32: Release = Release {
    suffix: "linux-i686.tar.bz2",
    checksum: "4bc37cb8c58e5ddfa76ffd066ebceb04529d74a0e52066d9bed9759c30e5841b",
};
const MAC: Release = Release {
    suffix: "mac.tar.bz2",
    checksum: "5c3ba9a83328a54b1fc6a6106abdd6d6b2117768f36ad43b9b0230a3ad7113cd",
};
const WIN32: Release = Release {
    suffix: "win32.zip",
    checksum: "4eead5e92a87f655f999ae79bf3c4eac191ec4bd93a19ffd8bbb2a12a1cb1ef4",
};

fn release_for(target: &PlatformTarget) -> Option<&'static Release> {
    match (target.platform.as_str(), target.arch.as_str()) {
        ("linux", "x64") => Some(&LINUX_X64),
        ("linux", "ia32") => Some(&LINUX_IA32),
        // The mac build is also what the BSDs run.
        ("darwin" | "openbsd" | "freebsd", _) => Some(&MAC),
        ("win32", _) => Some(&WIN32),
        _ => None,
    }
}

/// Selects download specs against a fixed CDN root.
#[derive(Debug, Clone)]
pub struct DownloadSpecSelector {
    cdn_root: String,
}

impl DownloadSpecSelector {
    /// Builds a selector for `cdn_url`, which must be an absolute URL.
    pub fn new(cdn_url: &str) -> Result<Self> {
        let parsed = Url::parse(cdn_url.trim()).with_context(|| format!("invalid CDN url: {}", cdn_url))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("CDN url cannot be used as a base: {}", cdn_url);
        }
        Ok(Self {
            cdn_root: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Returns `None` when no prebuilt archive exists for `target`; callers
    /// treat that as "install manually", not as an error.
    pub fn select(&self, target: &PlatformTarget, version: &str) -> Option<DownloadSpec> {
        let release = release_for(target)?;
        Some(DownloadSpec {
            url: format!(
                "{}/{}/slimerjs-{}-{}",
                self.cdn_root, version, version, release.suffix
            ),
            checksum: release.checksum.to_string(),
        })
    }
}

/// The CDN root from `npm_config_slimerjs_cdnurl`, `SLIMERJS_CDNURL`, then
/// the PhantomJS-named variables, falling back to `default_cdn`. Not validated.
pub fn cdn_url_from_env(default_cdn: &str) -> String {
    cdn_url_with(default_cdn, |key| std::env::var(key).ok())
}

/// CDN override resolution with an injectable variable lookup.
pub fn cdn_url_with<F>(default_cdn: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    CDN_ENV_ORDER
        .iter()
        .filter_map(|key| lookup(key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| default_cdn.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION: &str = "0.10.3";

    fn selector() -> DownloadSpecSelector {
        DownloadSpecSelector::new(DEFAULT_CDN_URL).unwrap()
    }

    fn is_lower_hex_64(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn supported_pairs_yield_well_formed_specs() {
        let pairs = [
            ("linux", "x64"),
            ("linux", "ia32"),
            ("darwin", "x64"),
            ("darwin", "arm64"),
            ("freebsd", "x64"),
            ("openbsd", "ia32"),
            ("win32", "x64"),
            ("win32", "ia32"),
        ];
        for (platform, arch) in pairs {
            let spec = selector()
                .select(&PlatformTarget::new(platform, arch), VERSION)
                .unwrap_or_else(|| panic!("expected spec for {}/{}", platform, arch));
            assert!(spec.url.contains(VERSION), "url {} lacks version", spec.url);
            assert!(Url::parse(&spec.url).is_ok(), "url {} does not parse", spec.url);
            assert!(is_lower_hex_64(&spec.checksum), "bad checksum {}", spec.checksum);
        }
    }

    #[test]
    fn unsupported_pairs_yield_none() {
        for (platform, arch) in [("linux", "arm64"), ("linux", "arm"), ("sunos", "x64"), ("aix", "ppc64"), ("", "")] {
            assert!(selector().select(&PlatformTarget::new(platform, arch), VERSION).is_none());
        }
    }

    #[test]
    fn url_layout() {
        let spec = selector()
            .select(&PlatformTarget::new("linux", "x64"), VERSION)
            .unwrap();
        assert_eq!(
            spec.url,
            "https://github.com/graingert/slimer-downloads/releases/download/0.10.3/slimerjs-0.10.3-linux-x86_64.tar.bz2"
        );
        let win = selector()
            .select(&PlatformTarget::new("win32", "x64"), VERSION)
            .unwrap();
        assert!(win.url.ends_with("/slimerjs-0.10.3-win32.zip"));
    }

    #[test]
    fn custom_cdn_without_trailing_slash() {
        let sel = DownloadSpecSelector::new("http://mirror.local/slimer").unwrap();
        let spec = sel.select(&PlatformTarget::new("darwin", "x64"), VERSION).unwrap();
        assert_eq!(spec.url, "http://mirror.local/slimer/0.10.3/slimerjs-0.10.3-mac.tar.bz2");
    }

    #[test]
    fn invalid_cdn_rejected() {
        assert!(DownloadSpecSelector::new("not a url").is_err());
        assert!(DownloadSpecSelector::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn cdn_override_priority() {
        let both = |key: &str| match key {
            NPM_CDN_ENV => Some("http://npm.mirror/".to_string()),
            CDN_ENV => Some("http://plain.mirror/".to_string()),
            _ => None,
        };
        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, both), "http://npm.mirror/");

        let plain = |key: &str| (key == CDN_ENV).then(|| "http://plain.mirror/".to_string());
        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, plain), "http://plain.mirror/");

        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, |_| None), DEFAULT_CDN_URL);
        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, |_| Some(String::new())), DEFAULT_CDN_URL);
    }

    #[test]
    fn phantomjs_names_are_fallbacks() {
        let legacy = |key: &str| match key {
            LEGACY_NPM_CDN_ENV => Some("http://npm.phantom/".to_string()),
            LEGACY_CDN_ENV => Some("http://plain.phantom/".to_string()),
            _ => None,
        };
        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, legacy), "http://npm.phantom/");

        let plain_legacy = |key: &str| (key == LEGACY_CDN_ENV).then(|| "http://plain.phantom/".to_string());
        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, plain_legacy), "http://plain.phantom/");

        let mixed = |key: &str| match key {
            CDN_ENV => Some("http://slimer.mirror/".to_string()),
            LEGACY_NPM_CDN_ENV => Some("http://npm.phantom/".to_string()),
            _ => None,
        };
        assert_eq!(cdn_url_with(DEFAULT_CDN_URL, mixed), "http://slimer.mirror/");
    }
}
