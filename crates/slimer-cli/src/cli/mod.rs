//! CLI for the SlimerJS post-install resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use slimer_core::config::{self, ResolverConfig};
use slimer_core::download_spec::cdn_url_from_env;
use slimer_core::{resolve_platform, DownloadSpecSelector, PlatformTarget};
use std::path::{Path, PathBuf};

use commands::{
    run_checksum, run_completions, run_install, run_link, run_location, run_platform, run_spec,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "slimer-install")]
#[command(about = "Resolve, download and verify the SlimerJS binary for this platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Reuse a verified install or download, verify and unpack a fresh one.
    Install {
        /// Install directory (default: from config, else ~/.local/share/slimer-install).
        #[arg(long, value_name = "DIR")]
        install_dir: Option<PathBuf>,
        /// Location record of another install to try reusing first. Repeatable.
        #[arg(long = "record", value_name = "FILE")]
        records: Vec<PathBuf>,
    },

    /// Try to reuse the binary named by an existing location record.
    Link {
        /// Path to the location record.
        record: PathBuf,
        /// Install directory whose record is rewritten on success.
        #[arg(long, value_name = "DIR")]
        install_dir: Option<PathBuf>,
    },

    /// Print the download URL and checksum for the target platform.
    Spec {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved target platform and architecture.
    Platform,

    /// Show the recorded binary location.
    Location {
        #[arg(long, value_name = "DIR")]
        install_dir: Option<PathBuf>,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Compute SHA-256 of a file, or check it against an expected digest.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Expected lowercase hex digest.
        #[arg(long, value_name = "HEX")]
        expected: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        shell: Shell,
    },
}

/// Values every command resolves the same way.
pub(crate) struct Context {
    pub cfg: ResolverConfig,
    pub target: PlatformTarget,
}

impl Context {
    fn load() -> Result<Self> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(Self {
            cfg,
            target: resolve_platform(),
        })
    }

    /// CDN root after environment overrides. Validated only when a download
    /// spec is actually needed.
    pub fn cdn_url(&self) -> String {
        cdn_url_from_env(&self.cfg.cdn_url)
    }

    pub fn selector(&self) -> Result<DownloadSpecSelector> {
        DownloadSpecSelector::new(&self.cdn_url())
    }

    pub fn install_dir(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(dir) => Ok(dir.to_path_buf()),
            None => self.cfg.resolved_install_dir(),
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Install { install_dir, records } => {
                run_install(&Context::load()?, install_dir.as_deref(), &records).await?
            }
            CliCommand::Link { record, install_dir } => {
                run_link(&Context::load()?, &record, install_dir.as_deref()).await?
            }
            CliCommand::Spec { json } => run_spec(&Context::load()?, json)?,
            CliCommand::Platform => run_platform(&Context::load()?),
            CliCommand::Location { install_dir, json } => {
                run_location(&Context::load()?, install_dir.as_deref(), json)?
            }
            CliCommand::Checksum { path, expected } => run_checksum(&path, expected.as_deref())?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
