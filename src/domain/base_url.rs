//! The service's own public base URL.
//!
//! Parsed once from configuration and handed to everything that needs the
//! service host: the hash-id codec salt, the self-link check, and the derived
//! short URLs.

use url::Url;

/// Errors raised while parsing the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BaseUrlError {
    #[error("Invalid base URL: {0}")]
    InvalidFormat(String),

    #[error("Base URL must use http or https")]
    UnsupportedProtocol,

    #[error("Base URL must contain a host")]
    MissingHost,
}

/// Public base URL of the service, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    host: String,
}

impl BaseUrl {
    /// Parses and validates a base URL such as `https://sho.rt` or `http://localhost:3000/`.
    ///
    /// # Errors
    ///
    /// Returns [`BaseUrlError`] for malformed URLs, non-HTTP(S) schemes or URLs
    /// without a host.
    pub fn parse(raw: &str) -> Result<Self, BaseUrlError> {
        let parsed =
            Url::parse(raw.trim()).map_err(|e| BaseUrlError::InvalidFormat(e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BaseUrlError::UnsupportedProtocol);
        }

        let host = host_with_port(&parsed).ok_or(BaseUrlError::MissingHost)?;

        let mut url = parsed;
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self {
            url: url.as_str().trim_end_matches('/').to_string(),
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Host of the service including a non-default port, e.g. `sho.rt` or `localhost:3000`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Appends a single path segment: `<base>/<segment>`.
    pub fn join(&self, segment: &str) -> String {
        format!("{}/{}", self.url, segment)
    }

    /// Returns true if `url` points at this service.
    ///
    /// Hosts are compared case-insensitively, including the port, and a
    /// leading `www.` is ignored on both sides.
    pub fn is_own_host(&self, url: &Url) -> bool {
        host_with_port(url).is_some_and(|other| {
            strip_www(&other).eq_ignore_ascii_case(strip_www(&self.host))
        })
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
