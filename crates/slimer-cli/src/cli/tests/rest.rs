//! Tests for spec, platform, location, checksum, completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;
use std::path::Path;

#[test]
fn cli_parse_spec() {
    match parse(&["slimer-install", "spec"]) {
        CliCommand::Spec { json } => assert!(!json),
        _ => panic!("expected Spec"),
    }
    match parse(&["slimer-install", "spec", "--json"]) {
        CliCommand::Spec { json } => assert!(json),
        _ => panic!("expected Spec --json"),
    }
}

#[test]
fn cli_parse_platform() {
    assert!(matches!(parse(&["slimer-install", "platform"]), CliCommand::Platform));
}

#[test]
fn cli_parse_location() {
    match parse(&["slimer-install", "location", "--install-dir", "/tmp/s", "--json"]) {
        CliCommand::Location { install_dir, json } => {
            assert_eq!(install_dir.as_deref(), Some(Path::new("/tmp/s")));
            assert!(json);
        }
        _ => panic!("expected Location"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["slimer-install", "checksum", "test/exit.js"]) {
        CliCommand::Checksum { path, expected } => {
            assert_eq!(path, Path::new("test/exit.js"));
            assert!(expected.is_none());
        }
        _ => panic!("expected Checksum"),
    }
    match parse(&["slimer-install", "checksum", "a.zip", "--expected", "blargh"]) {
        CliCommand::Checksum { expected, .. } => assert_eq!(expected.as_deref(), Some("blargh")),
        _ => panic!("expected Checksum --expected"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["slimer-install", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
    assert!(Cli::try_parse_from(["slimer-install", "completions", "tcsh"]).is_err());
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["slimer-install", "exec"]).is_err());
}
