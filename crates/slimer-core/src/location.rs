//! Persisted pointer to the last known good binary (`location.toml`).
//!
//! The file is generated by hand rather than through a serializer so the
//! platform/arch lines can be dropped when they would not be safe literals.
//! It is plain TOML, so reading goes through `toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::PlatformTarget;

/// File name of the record inside an install directory.
pub const LOCATION_FILE: &str = "location.toml";

/// Previously resolved binary plus the target it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Absolute, or relative to the directory holding the record.
    pub location: PathBuf,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

impl LocationRecord {
    /// Reads a record. A missing file is `Ok(None)`; unreadable or malformed
    /// files are errors the caller may downgrade.
    pub fn load(path: &Path) -> Result<Option<LocationRecord>> {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read location record: {}", path.display())),
        };
        let record: LocationRecord =
            toml::from_str(&data).with_context(|| format!("parse location record: {}", path.display()))?;
        Ok(Some(record))
    }

    /// `location` resolved against the directory of `record_path`, not the
    /// process working directory.
    pub fn resolve_against(&self, record_path: &Path) -> PathBuf {
        match record_path.parent() {
            Some(dir) => dir.join(&self.location),
            None => self.location.clone(),
        }
    }

    /// True when both platform and arch are present and equal `target`.
    pub fn matches_target(&self, target: &PlatformTarget) -> bool {
        self.platform.as_deref() == Some(target.platform.as_str())
            && self.arch.as_deref() == Some(target.arch.as_str())
    }
}

/// Whether platform/arch strings are safe to persist verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataCheck {
    Valid,
    Invalid { field: MetadataField },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Platform,
    Arch,
}

/// Both values must be ASCII alphanumeric. They may come from environment
/// overrides, so anything else is left out of the record.
pub fn validate_metadata(target: &PlatformTarget) -> MetadataCheck {
    let ok = |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric());
    if !ok(&target.platform) {
        MetadataCheck::Invalid {
            field: MetadataField::Platform,
        }
    } else if !ok(&target.arch) {
        MetadataCheck::Invalid {
            field: MetadataField::Arch,
        }
    } else {
        MetadataCheck::Valid
    }
}

/// Escapes a value for a double-quoted string literal. Backslashes matter for
/// win32 paths; quotes and control characters would otherwise end the line.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Renders the record file contents for `location` resolved on `target`.
pub fn render_record(location: &str, target: &PlatformTarget) -> String {
    let mut contents = format!("location = \"{}\"\n", escape_literal(location));
    match validate_metadata(target) {
        MetadataCheck::Valid => {
            let _ = writeln!(contents, "platform = \"{}\"", target.platform);
            let _ = writeln!(contents, "arch = \"{}\"", target.arch);
        }
        MetadataCheck::Invalid { field } => {
            tracing::warn!(
                "omitting platform/arch from location record: {:?} of {} is not alphanumeric",
                field,
                target
            );
        }
    }
    contents
}

/// Writes the location record for a verified binary. Repeated calls with the
/// same inputs produce the same file.
#[derive(Debug, Clone)]
pub struct LocationRecorder {
    record_path: PathBuf,
}

impl LocationRecorder {
    pub fn new(record_path: impl Into<PathBuf>) -> Self {
        Self {
            record_path: record_path.into(),
        }
    }

    /// Recorder for `<install_dir>/location.toml`.
    pub fn in_dir(install_dir: &Path) -> Self {
        Self::new(install_dir.join(LOCATION_FILE))
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn record(&self, location: &Path, target: &PlatformTarget) -> Result<()> {
        let location_str = location
            .to_str()
            .with_context(|| format!("binary path is not valid UTF-8: {}", location.display()))?;
        if let Some(parent) = self.record_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("create dir: {}", parent.display()))?;
            }
        }
        tracing::info!("writing location record {}", self.record_path.display());
        fs::write(&self.record_path, render_record(location_str, target))
            .with_context(|| format!("write location record: {}", self.record_path.display()))?;
        Ok(())
    }
}
