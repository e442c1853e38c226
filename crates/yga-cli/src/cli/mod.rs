//! CLI for the yga group-API client.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use yga_core::config::{self, YgaConfig};
use yga_core::GroupClient;

use commands::{run_download, run_fetch, run_resources};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "yga")]
#[command(about = "yga: fetch JSON resources and files from a Yahoo Groups API mirror", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Session options. Each one overrides the matching field of config.toml.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// Group to fetch from.
    #[arg(long, short = 'g', global = true)]
    pub group: Option<String>,

    /// Seconds to wait before every request.
    #[arg(long, global = true, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Netscape cookie file.
    #[arg(long, global = true, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Cookie header value for .yahoo.com, e.g. "T=...; Y=...".
    #[arg(long, global = true, value_name = "PAIRS")]
    pub cookie: Option<String>,

    /// Extra request header (repeatable).
    #[arg(long = "header", short = 'H', global = true, value_name = "NAME:VALUE", value_parser = parse_header_arg)]
    pub headers: Vec<(String, String)>,

    /// Archive every HTTP exchange to a HAR file.
    #[arg(long, global = true, value_name = "FILE")]
    pub har: Option<PathBuf>,

    /// Pinned certificate chain (PEM).
    #[arg(long, global = true, value_name = "FILE")]
    pub ca_bundle: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a resource and print its payload as JSON.
    Fetch {
        /// Resource name (see `yga resources`).
        resource: String,

        /// Extra path segments, e.g. a message id and "raw".
        parts: Vec<String>,

        /// Query parameter (repeatable).
        #[arg(long = "query", short = 'q', value_name = "KEY=VALUE", value_parser = parse_query_arg)]
        query: Vec<(String, String)>,

        /// Print on one line instead of pretty-printing.
        #[arg(long)]
        compact: bool,
    },

    /// Download a file or attachment URL.
    Download {
        /// Absolute URL to download.
        url: String,

        /// Output file (default: stdout).
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List known resource names and their API versions.
    Resources,
}

impl GlobalArgs {
    /// Overlay command-line options on the loaded config.
    pub fn apply(&self, cfg: &mut YgaConfig) {
        if let Some(group) = &self.group {
            cfg.group = Some(group.clone());
        }
        if let Some(delay) = self.delay {
            cfg.delay_secs = delay;
        }
        if let Some(path) = &self.cookies {
            cfg.cookie_file = Some(path.clone());
        }
        if let Some(cookie) = &self.cookie {
            cfg.cookie = Some(cookie.clone());
        }
        if let Some(path) = &self.har {
            cfg.capture_har = Some(path.clone());
        }
        if let Some(path) = &self.ca_bundle {
            cfg.ca_bundle = Some(path.clone());
        }
    }

    fn build_client(&self, cfg: &YgaConfig) -> Result<GroupClient> {
        let client = cfg
            .client_builder()?
            .headers(self.headers.iter().cloned())
            .build()
            .context("setting up session")?;
        tracing::debug!(?client, "client ready");
        Ok(client)
    }
}

fn parse_header_arg(s: &str) -> Result<(String, String), String> {
    yga_core::client::parse_header(s).map_err(|e| e.to_string())
}

fn parse_query_arg(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if k.is_empty() {
        return Err(format!("empty query key in {:?}", s));
    }
    Ok((k.to_string(), v.to_string()))
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Resources = cli.command {
            return run_resources();
        }

        let mut cfg = config::load_or_init()?;
        cli.global.apply(&mut cfg);
        tracing::debug!("effective config: {:?}", cfg);
        let mut client = cli.global.build_client(&cfg)?;

        match cli.command {
            CliCommand::Fetch {
                resource,
                parts,
                query,
                compact,
            } => run_fetch(&mut client, &resource, &parts, &query, compact)?,
            CliCommand::Download { url, output } => {
                run_download(&mut client, &url, output.as_deref())?
            }
            CliCommand::Resources => run_resources()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
