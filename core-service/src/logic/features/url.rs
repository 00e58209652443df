//! URL parsing for feature extraction
//!
//! Normalizes a raw string with the WHATWG parser and rejects anything that
//! has no scheme or no host before a single feature is computed.

use url::{Host, Url};

use super::ExtractionError;
use crate::constants::MAX_URL_LENGTH;

/// Kind of host the URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Domain,
    Ipv4,
    Ipv6,
}

/// A URL that passed validation, plus the raw text it came from
#[derive(Debug, Clone)]
pub struct ParsedUrl {
    raw: String,
    url: Url,
    host: String,
    host_kind: HostKind,
}

impl ParsedUrl {
    pub fn parse(input: &str) -> Result<Self, ExtractionError> {
        let raw = input.trim();

        if raw.is_empty() {
            return Err(ExtractionError::invalid(raw, "empty URL"));
        }

        let length = raw.chars().count();
        if length > MAX_URL_LENGTH {
            return Err(ExtractionError::TooLong { length, max: MAX_URL_LENGTH });
        }

        let url = Url::parse(raw).map_err(|e| ExtractionError::invalid(raw, e.to_string()))?;

        let (host, host_kind) = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => (domain.to_string(), HostKind::Domain),
            Some(Host::Ipv4(addr)) => (addr.to_string(), HostKind::Ipv4),
            Some(Host::Ipv6(addr)) => (addr.to_string(), HostKind::Ipv6),
            _ => return Err(ExtractionError::invalid(raw, "URL has no host")),
        };

        Ok(Self {
            raw: raw.to_string(),
            url,
            host,
            host_kind,
        })
    }

    /// Trimmed input text, exactly as supplied
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Normalized host (lowercase, no brackets for IPv6)
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn host_kind(&self) -> HostKind {
        self.host_kind
    }

    pub fn is_ip_host(&self) -> bool {
        self.host_kind != HostKind::Domain
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Domain labels, empty for IP hosts
    pub fn domain_labels(&self) -> Vec<&str> {
        match self.host_kind {
            HostKind::Domain => self
                .host
                .trim_end_matches('.')
                .split('.')
                .filter(|l| !l.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}
