//! URL normalization and sanitization utilities.
//!
//! Ensures consistent URL representation so that equivalent inputs are stored,
//! and looked up, as the same string.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::domain::normalizer::{UrlNormalizationError, UrlNormalizer};

/// Leading `scheme:` with an optional `//` authority marker.
static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d+\-.]*:(//)?").unwrap());

/// What must remain after stripping `www.` for the strip to apply.
static WWW_REMAINDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z\-\d]{1,63}\.[a-z.\-\d]{2,63}$").unwrap());

static DUPLICATE_SLASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/{2,}").unwrap());

/// Normalizes a URL to a canonical HTTPS form.
///
/// # Normalization Rules
///
/// 1. **Protocol**: Missing or protocol-relative schemes default to HTTP; only HTTP
///    and HTTPS are accepted; the result is always HTTPS
/// 2. **Credentials**: Removed
/// 3. **Hostname**: Lowercase, trailing dots and a leading `www.` removed
/// 4. **Default ports**: Removed
/// 5. **Path**: Duplicate slashes collapsed, trailing slash removed
/// 6. **Query parameters**: `utm_*` removed, the rest sorted by key
/// 7. **Fragments**: Preserved, except text-fragment directives (`#:~:text=`)
///
/// A bare host serializes without a trailing slash.
///
/// # Security
///
/// Rejects potentially dangerous protocols like `javascript:`, `data:`, `file:`, etc.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTP://Example.com/Path").unwrap(),
///     "https://example.com/Path"
/// );
///
/// assert_eq!(
///     normalize_url("www.example.com/a/?utm_source=x&b=2&a=1").unwrap(),
///     "https://example.com/a?a=1&b=2"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let candidate = with_default_protocol(input.trim());

    let mut url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    url.set_scheme("https").map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to force https".to_string())
    })?;

    if url.port() == Some(443) {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    url.set_username("").map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to strip credentials".to_string())
    })?;
    url.set_password(None).map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to strip credentials".to_string())
    })?;

    normalize_host(&mut url)?;
    normalize_path(&mut url);
    normalize_query(&mut url);
    normalize_fragment(&mut url);

    let mut normalized = url.to_string();
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        normalized.pop();
    }

    Ok(normalized)
}

/// [`UrlNormalizer`] backed by [`normalize_url`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpsUrlNormalizer;

impl UrlNormalizer for HttpsUrlNormalizer {
    fn normalize(&self, input: &str) -> Result<String, UrlNormalizationError> {
        normalize_url(input)
    }
}

/// Prefixes `http://` when the input has no scheme of its own.
///
/// `host:port` inputs (`localhost:3000/x`) are treated as scheme-less, while
/// opaque schemes (`mailto:`, `javascript:`) are left alone so they get rejected.
fn with_default_protocol(input: &str) -> String {
    if let Some(rest) = input.strip_prefix("//") {
        return format!("http://{}", rest);
    }

    match SCHEME_PREFIX.captures(input) {
        Some(caps) if caps.get(1).is_some() => input.to_string(),
        Some(caps) => {
            let after_colon = &input[caps.get(0).map_or(0, |m| m.end())..];
            if after_colon.starts_with(|c: char| c.is_ascii_digit()) {
                format!("http://{}", input)
            } else {
                input.to_string()
            }
        }
        None => format!("http://{}", input),
    }
}

fn normalize_host(url: &mut Url) -> Result<(), UrlNormalizationError> {
    let Some(host) = url.host_str() else {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    };

    let mut host = host.trim_end_matches('.').to_ascii_lowercase();

    if host.is_empty() {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL host is empty".to_string(),
        ));
    }

    if let Some(rest) = host.strip_prefix("www.")
        && !rest.starts_with("www.")
        && WWW_REMAINDER.is_match(rest)
    {
        host = rest.to_string();
    }

    if url.host_str() != Some(host.as_str()) {
        url.set_host(Some(&host)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    Ok(())
}

fn normalize_path(url: &mut Url) {
    let collapsed = DUPLICATE_SLASHES.replace_all(url.path(), "/").into_owned();

    let path = match collapsed.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => collapsed,
    };

    if path != url.path() {
        url.set_path(&path);
    }
}

fn normalize_query(url: &mut Url) {
    if url.query().is_none() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(key, _)| !key.to_ascii_lowercase().starts_with("utm_"))
        .collect();

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

fn normalize_fragment(url: &mut Url) {
    let Some(fragment) = url.fragment() else {
        return;
    };

    let kept = match fragment.find(":~:") {
        Some(directive) => &fragment[..directive],
        None => fragment,
    }
    .to_string();

    if kept.is_empty() {
        url.set_fragment(None);
    } else if kept != fragment {
        url.set_fragment(Some(&kept));
    }
}
