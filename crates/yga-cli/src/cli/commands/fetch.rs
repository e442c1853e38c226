//! `yga fetch` – fetch one resource and print its payload.

use anyhow::{Context, Result};
use std::io::Write;
use yga_core::GroupClient;

pub fn run_fetch(
    client: &mut GroupClient,
    resource: &str,
    parts: &[String],
    query: &[(String, String)],
    compact: bool,
) -> Result<()> {
    let data = client
        .fetch(resource, parts, query.iter().cloned())
        .with_context(|| format!("fetching {} from group {}", resource, client.group()))?;

    let text = if compact {
        serde_json::to_string(&data)?
    } else {
        serde_json::to_string_pretty(&data)?
    };
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", text)?;
    Ok(())
}
