//! Caller-supplied cookies, fed to the curl cookie engine.
//!
//! Accepts individual cookies, a `Cookie:` header value, or a Netscape
//! `cookies.txt` file as exported by browsers.

use crate::error::ConfigError;
use std::fs;
use std::path::Path;

/// Domain used when a cookie is given without one.
pub const DEFAULT_COOKIE_DOMAIN: &str = ".yahoo.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Leading dot means the cookie also applies to subdomains.
    pub domain: String,
    pub path: String,
    pub secure: bool,
    /// Unix expiry; 0 for a session cookie.
    pub expires: u64,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".to_string(),
            secure: false,
            expires: 0,
        }
    }

    /// One line in Netscape cookie-file format, as understood by
    /// `CURLOPT_COOKIELIST`.
    pub fn netscape_line(&self) -> String {
        let flag = |b: bool| if b { "TRUE" } else { "FALSE" };
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.domain,
            flag(self.domain.starts_with('.')),
            self.path,
            flag(self.secure),
            self.expires,
            self.name,
            self.value
        )
    }
}

/// Pre-populated cookie store handed to the session at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing any with the same name, domain and path.
    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies
            .retain(|c| !(c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path));
        self.cookies.push(cookie);
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Parse a `Cookie:` header value (`T=abc; Y=def`) into cookies for `domain`.
    pub fn from_header(header: &str, domain: &str) -> Self {
        let mut jar = Self::new();
        for pair in header.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    jar.insert(Cookie::new(name, value.trim(), domain));
                }
            }
        }
        jar
    }

    /// Parse Netscape cookie-file text. Comments, blank lines and malformed
    /// lines are skipped; `#HttpOnly_` prefixed lines are kept.
    pub fn parse_netscape(text: &str) -> Self {
        let mut jar = Self::new();
        for line in text.lines() {
            let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 7 {
                tracing::debug!("skipping malformed cookie line");
                continue;
            }
            jar.insert(Cookie {
                domain: fields[0].to_string(),
                path: fields[2].to_string(),
                secure: fields[3].eq_ignore_ascii_case("TRUE"),
                expires: fields[4].parse().unwrap_or(0),
                name: fields[5].to_string(),
                value: fields[6].to_string(),
            });
        }
        jar
    }

    /// Load a Netscape `cookies.txt` file.
    pub fn from_netscape_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::CookieFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_netscape(&text))
    }

    pub(crate) fn netscape_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cookies.iter().map(Cookie::netscape_line)
    }
}
