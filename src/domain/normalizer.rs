//! URL normalization capability.

/// Errors that can occur during URL normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Rewrites URLs into a canonical form so equivalent inputs compare equal.
///
/// Implementations must be idempotent: normalizing an already-normalized URL
/// returns it unchanged.
///
/// # Implementations
///
/// - [`crate::utils::url_normalizer::HttpsUrlNormalizer`]
#[cfg_attr(test, mockall::automock)]
pub trait UrlNormalizer: Send + Sync {
    /// Normalizes `input`, validating it along the way.
    fn normalize(&self, input: &str) -> Result<String, UrlNormalizationError>;
}
