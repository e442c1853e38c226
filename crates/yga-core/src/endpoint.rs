//! Resource registry and request URI construction.
//!
//! Every resource the API exposes is bound to one API version. Names are
//! resolved against this fixed table before any network activity, so an
//! unknown name never reaches the transport.

use crate::error::FetchError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Base URI of the group API.
pub const BASE_URI: &str = "https://groups.yahoo.com/api";

/// API version segment of a request URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named category of group data exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Group root info. Reached without a resource suffix.
    HackGroupInfo,
    Messages,
    Files,
    Albums,
    Database,
    Links,
    Statistics,
    Polls,
    Attachments,
    Members,
}

impl Resource {
    /// Every known resource, in registry order.
    pub const ALL: [Resource; 10] = [
        Resource::HackGroupInfo,
        Resource::Messages,
        Resource::Files,
        Resource::Albums,
        Resource::Database,
        Resource::Links,
        Resource::Statistics,
        Resource::Polls,
        Resource::Attachments,
        Resource::Members,
    ];

    /// Registry name, as accepted by [`Resource::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Resource::HackGroupInfo => "HackGroupInfo",
            Resource::Messages => "messages",
            Resource::Files => "files",
            Resource::Albums => "albums",
            Resource::Database => "database",
            Resource::Links => "links",
            Resource::Statistics => "statistics",
            Resource::Polls => "polls",
            Resource::Attachments => "attachments",
            Resource::Members => "members",
        }
    }

    /// API version this resource is served under.
    ///
    /// Albums stay on v2: v3 moves photo locations around in the payload.
    pub fn api_version(self) -> ApiVersion {
        match self {
            Resource::Files | Resource::Albums => ApiVersion::V2,
            _ => ApiVersion::V1,
        }
    }

    /// Path segment placed after `groups/{group}/`. Empty for the root info.
    pub fn path_segment(self) -> &'static str {
        match self {
            Resource::HackGroupInfo => "",
            other => other.name(),
        }
    }

    pub fn endpoint(self) -> GroupEndpoint {
        GroupEndpoint {
            name: self,
            api_version: self.api_version(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s)
            .ok_or_else(|| FetchError::UnknownResource(s.to_string()))
    }
}

/// Immutable registry entry: resource name plus its API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEndpoint {
    pub name: Resource,
    pub api_version: ApiVersion,
}

/// One logical request, built per call and consumed once.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub group: String,
    pub endpoint: GroupEndpoint,
    pub path_segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new<P, Q, K, V>(group: &str, resource: Resource, parts: P, query: Q) -> Self
    where
        P: IntoIterator,
        P::Item: ToString,
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            group: group.to_string(),
            endpoint: resource.endpoint(),
            path_segments: parts.into_iter().map(|p| p.to_string()).collect(),
            query: query
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// `{base}/{version}/groups/{group}/{resource}/{part1}/...`
    ///
    /// Parts are joined as given; the caller is responsible for valid segments.
    pub fn uri(&self, base: &str) -> String {
        let mut parts: Vec<&str> = vec![
            base,
            self.endpoint.api_version.as_str(),
            "groups",
            &self.group,
            self.endpoint.name.path_segment(),
        ];
        parts.extend(self.path_segments.iter().map(String::as_str));
        parts.join("/")
    }

    /// Full request URL with the query string appended.
    pub fn url(&self, base: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.uri(base))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}
