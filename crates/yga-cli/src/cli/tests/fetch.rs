//! Tests for fetch, download, resources.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_fetch_minimal() {
    match parse(&["yga", "fetch", "messages"]) {
        CliCommand::Fetch {
            resource,
            parts,
            query,
            compact,
        } => {
            assert_eq!(resource, "messages");
            assert!(parts.is_empty());
            assert!(query.is_empty());
            assert!(!compact);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_parts_and_query() {
    match parse(&[
        "yga", "fetch", "messages", "123", "raw", "-q", "count=50", "--query", "start=1",
        "--compact",
    ]) {
        CliCommand::Fetch {
            resource,
            parts,
            query,
            compact,
        } => {
            assert_eq!(resource, "messages");
            assert_eq!(parts, vec!["123", "raw"]);
            assert_eq!(
                query,
                vec![
                    ("count".to_string(), "50".to_string()),
                    ("start".to_string(), "1".to_string())
                ]
            );
            assert!(compact);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_query_value_may_contain_equals() {
    match parse(&["yga", "fetch", "files", "-q", "sfpath=/a=b"]) {
        CliCommand::Fetch { query, .. } => {
            assert_eq!(query, vec![("sfpath".to_string(), "/a=b".to_string())]);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_rejects_bad_query() {
    assert!(Cli::try_parse_from(["yga", "fetch", "messages", "-q", "nokey"]).is_err());
    assert!(Cli::try_parse_from(["yga", "fetch", "messages", "-q", "=v"]).is_err());
}

#[test]
fn cli_parse_fetch_requires_resource() {
    assert!(Cli::try_parse_from(["yga", "fetch"]).is_err());
}

#[test]
fn cli_parse_download() {
    match parse(&["yga", "download", "https://xa.yimg.com/kq/groups/1/f.zip"]) {
        CliCommand::Download { url, output } => {
            assert_eq!(url, "https://xa.yimg.com/kq/groups/1/f.zip");
            assert!(output.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_output() {
    match parse(&["yga", "download", "https://x/f.zip", "-o", "out/f.zip"]) {
        CliCommand::Download { output, .. } => {
            assert_eq!(output, Some(PathBuf::from("out/f.zip")));
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_resources() {
    match parse(&["yga", "resources"]) {
        CliCommand::Resources => {}
        _ => panic!("expected Resources"),
    }
}
