//! Validation and normalization applied to every link before it is persisted.

use std::sync::Arc;

use metrics::counter;
use url::Url;

use crate::domain::base_url::BaseUrl;
use crate::domain::codec::HashIdCodec;
use crate::domain::normalizer::{UrlNormalizationError, UrlNormalizer};
use crate::utils::hash_canonical::{InvalidHash, canonicalize_hash, validate_canonical_hash};

/// Reasons submitted link fields are refused. All of them are client errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkInputError {
    /// The canonical hash decodes to a valid auto-generated id.
    #[error("Cannot use hash {0}")]
    HashCollision(String),

    #[error(transparent)]
    InvalidHash(#[from] InvalidHash),

    #[error("{0}")]
    InvalidUrl(#[from] UrlNormalizationError),

    /// The URL points back at the service itself.
    #[error("Cannot shorten {0} URLs")]
    OwnDomain(String),
}

impl LinkInputError {
    /// Stable identifier used in error details and metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            LinkInputError::HashCollision(_) => "hash_collision",
            LinkInputError::InvalidHash(_) => "invalid_hash",
            LinkInputError::InvalidUrl(_) => "invalid_url",
            LinkInputError::OwnDomain(_) => "own_domain",
        }
    }
}

/// Raw or processed link fields. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInput {
    pub hash: Option<String>,
    pub original_url: Option<String>,
}

/// Canonicalizes custom hashes and normalizes destination URLs.
///
/// Holds the two injected capabilities links depend on (the [`HashIdCodec`] and
/// the [`UrlNormalizer`]) together with the service's own [`BaseUrl`].
pub struct LinkInputProcessor {
    codec: Arc<dyn HashIdCodec>,
    normalizer: Arc<dyn UrlNormalizer>,
    base_url: BaseUrl,
    hash_min_length: usize,
}

impl LinkInputProcessor {
    pub fn new(
        codec: Arc<dyn HashIdCodec>,
        normalizer: Arc<dyn UrlNormalizer>,
        base_url: BaseUrl,
        hash_min_length: usize,
    ) -> Self {
        Self {
            codec,
            normalizer,
            base_url,
            hash_min_length,
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn codec(&self) -> &dyn HashIdCodec {
        self.codec.as_ref()
    }

    /// Processes every present field of `input`.
    ///
    /// # Errors
    ///
    /// Returns the first [`LinkInputError`] encountered; the hash is checked
    /// before the URL.
    pub fn process(&self, input: LinkInput) -> Result<LinkInput, LinkInputError> {
        let result = self.process_fields(input);

        if let Err(e) = &result {
            counter!("link_input_rejected_total", "reason" => e.reason()).increment(1);
            tracing::warn!(reason = e.reason(), error = %e, "Rejected link input");
        }

        result
    }

    fn process_fields(&self, input: LinkInput) -> Result<LinkInput, LinkInputError> {
        let hash = non_empty(input.hash)
            .map(|raw| self.process_hash(&raw))
            .transpose()?;

        let original_url = non_empty(input.original_url)
            .map(|raw| self.process_url(&raw))
            .transpose()?;

        Ok(LinkInput { hash, original_url })
    }

    /// Canonicalizes and validates a custom hash.
    ///
    /// # Errors
    ///
    /// - [`LinkInputError::InvalidHash`] if the canonical form breaks a hash rule
    /// - [`LinkInputError::HashCollision`] if the canonical form decodes to an id
    pub fn process_hash(&self, raw: &str) -> Result<String, LinkInputError> {
        let hash = canonicalize_hash(raw);
        validate_canonical_hash(&hash, self.hash_min_length)?;

        if self.codec.decode(&hash).is_some() {
            return Err(LinkInputError::HashCollision(hash));
        }

        Ok(hash)
    }

    /// Normalizes a destination URL and refuses links to the service itself.
    ///
    /// # Errors
    ///
    /// - [`LinkInputError::InvalidUrl`] if the URL cannot be normalized
    /// - [`LinkInputError::OwnDomain`] if its host is the service host
    pub fn process_url(&self, raw: &str) -> Result<String, LinkInputError> {
        let normalized = self.normalize_url(raw)?;

        let parsed = Url::parse(&normalized)
            .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

        if self.base_url.is_own_host(&parsed) {
            return Err(LinkInputError::OwnDomain(self.base_url.host().to_string()));
        }

        Ok(normalized)
    }

    /// Normalizes a URL exactly as [`Self::process_url`] does, without the host check.
    ///
    /// # Errors
    ///
    /// Returns [`LinkInputError::InvalidUrl`] for malformed input.
    pub fn normalize_url(&self, raw: &str) -> Result<String, LinkInputError> {
        Ok(self.normalizer.normalize(raw)?)
    }

    /// Decodes a hash id token into a primary key.
    pub fn decode_hash_id(&self, token: &str) -> Option<i64> {
        self.codec.decode(token)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
