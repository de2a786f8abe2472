//! Unpacking the release archive and locating the executable inside it.
//!
//! Decompression is left to the system `tar` (GNU tar and bsdtar both detect
//! bzip2; bsdtar on Windows also reads zip).

use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::platform::PlatformTarget;
use crate::process::ProcessRunner;

/// Archive-extraction seam.
pub trait Extractor {
    /// Unpacks `archive` into `dest` (which exists and is empty) and returns
    /// the path of the SlimerJS executable inside it.
    fn extract(&self, archive: &Path, dest: &Path) -> impl Future<Output = Result<PathBuf>> + Send;
}

pub struct TarExtractor<R> {
    runner: R,
    target: PlatformTarget,
}

impl<R: ProcessRunner + Sync> TarExtractor<R> {
    pub fn new(runner: R, target: PlatformTarget) -> Self {
        Self { runner, target }
    }
}

impl<R: ProcessRunner + Sync> Extractor for TarExtractor<R> {
    fn extract(&self, archive: &Path, dest: &Path) -> impl Future<Output = Result<PathBuf>> + Send {
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        async move {
            let archive_arg = archive
                .to_str()
                .with_context(|| format!("archive path is not valid UTF-8: {}", archive.display()))?;
            let dest_arg = dest
                .to_str()
                .with_context(|| format!("extract dir is not valid UTF-8: {}", dest.display()))?;
            tracing::info!("extracting {} into {}", archive.display(), dest.display());
            self.runner
                .run(Path::new("tar"), &["-xf", archive_arg, "-C", dest_arg])
                .await
                .with_context(|| format!("extract {}", archive.display()))?;

            let names = executable_names(&self.target);
            let binary = find_executable(&dest, names, 3)
                .with_context(|| format!("no {} found in {}", names.join(" or "), archive.display()))?;
            ensure_executable(&binary)?;
            Ok(binary)
        }
    }
}

/// File names the launcher has in the release archives for `target`.
pub fn executable_names(target: &PlatformTarget) -> &'static [&'static str] {
    if target.is_windows() {
        &["slimerjs.bat", "slimerjs.exe"]
    } else {
        &["slimerjs"]
    }
}

/// Breadth-first search for the first regular file named one of `names`,
/// at most `max_depth` directories deep. Name order is preference order.
pub fn find_executable(root: &Path, names: &[&str], max_depth: usize) -> Option<PathBuf> {
    let mut level = vec![root.to_path_buf()];
    for _ in 0..=max_depth {
        let mut next = Vec::new();
        for dir in &level {
            for name in names {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            let mut subdirs: Vec<PathBuf> = entries
                .flatten()
                .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
                .map(|e| e.path())
                .collect();
            subdirs.sort();
            next.extend(subdirs);
        }
        level = next;
    }
    None
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    if perms.mode() & 0o111 != 0o111 {
        perms.set_mode(perms.mode() | 0o755);
        std::fs::set_permissions(path, perms).with_context(|| format!("chmod {}", path.display()))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Path) -> Result<()> {
    Ok(())
}


#[cfg(all(test, unix))]
mod tar_tests {
    use super::*;
    use crate::process::SystemRunner;
    use std::time::Duration;

    #[tokio::test]
    async fn extracts_tarball_and_marks_executable() {
        let work = tempfile::tempdir().unwrap();
        let src = work.path().join("src").join("slimerjs-0.10.3");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("slimerjs"), b"#!/bin/sh\necho 'SlimerJS 0.10.3,'\n").unwrap();
        let archive = work.path().join("slimerjs.tar");
        let status = std::process::Command::new("tar")
            .arg("-cf")
            .arg(&archive)
            .arg("-C")
            .arg(work.path().join("src"))
            .arg("slimerjs-0.10.3")
            .status()
            .unwrap();
        assert!(status.success());

        let dest = work.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        let extractor = TarExtractor::new(
            SystemRunner::new(Duration::from_secs(30)),
            PlatformTarget::new("linux", "x64"),
        );
        let binary = extractor.extract(&archive, &dest).await.unwrap();
        assert_eq!(binary, dest.join("slimerjs-0.10.3").join("slimerjs"));

        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
