use crate::client::ClientBuilder;
use crate::error::ConfigError;
use crate::transport::{CookieJar, DEFAULT_COOKIE_DOMAIN};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// XDG prefix for config, data and state files.
pub const XDG_PREFIX: &str = "yga";

/// Pinned certificate chain looked up in the XDG data dirs.
pub const CA_BUNDLE_FILE: &str = "yahoogroups_cert_chain.pem";

/// Client settings loaded from `~/.config/yga/config.toml`. Every field is
/// optional in the file; command-line flags override what it says.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YgaConfig {
    /// Group to fetch from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Seconds to wait before every request.
    pub delay_secs: f64,
    /// Netscape cookie file (as exported by browsers or `curl -c`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_file: Option<PathBuf>,
    /// `Cookie:` header value, e.g. `T=...; Y=...`, applied to `.yahoo.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    /// Pinned CA chain; defaults to the XDG data file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_bundle: Option<PathBuf>,
    /// Archive every exchange to this HAR file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_har: Option<PathBuf>,
    /// Extra request headers, merged over the default `Referer`.
    pub headers: BTreeMap<String, String>,
}

impl YgaConfig {
    /// Cookies from `cookie_file` and `cookie`, the header value winning on
    /// conflicts. `None` when neither is set.
    pub fn cookie_jar(&self) -> Result<Option<CookieJar>, ConfigError> {
        let mut jar = match &self.cookie_file {
            Some(path) => CookieJar::from_netscape_file(path)?,
            None if self.cookie.is_none() => return Ok(None),
            None => CookieJar::new(),
        };
        if let Some(header) = &self.cookie {
            for c in CookieJar::from_header(header, DEFAULT_COOKIE_DOMAIN).iter() {
                jar.insert(c.clone());
            }
        }
        Ok(Some(jar))
    }

    /// Builder seeded from these settings. Fails when no group is set or the
    /// cookie file cannot be read.
    pub fn client_builder(&self) -> Result<ClientBuilder, ConfigError> {
        let group = self
            .group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .ok_or(ConfigError::EmptyGroup)?;
        let mut builder = ClientBuilder::new(group)
            .delay(self.delay_secs)
            .headers(self.headers.clone());
        if let Some(jar) = self.cookie_jar()? {
            builder = builder.cookies(jar);
        }
        if let Some(ca) = &self.ca_bundle {
            builder = builder.ca_bundle(ca);
        }
        if let Some(har) = &self.capture_har {
            builder = builder.capture_har(har);
        }
        Ok(builder)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(XDG_PREFIX)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<YgaConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = YgaConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: YgaConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

/// Locate the pinned certificate chain under the XDG data dirs
/// (`~/.local/share/yga/yahoogroups_cert_chain.pem` first).
pub fn default_ca_bundle() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(XDG_PREFIX)
        .map_err(|_| ConfigError::MissingCaBundle(PathBuf::from(CA_BUNDLE_FILE)))?;
    xdg_dirs
        .find_data_file(CA_BUNDLE_FILE)
        .ok_or_else(|| ConfigError::MissingCaBundle(xdg_dirs.get_data_home().join(CA_BUNDLE_FILE)))
}
