//! Reversible obfuscation of numeric primary keys.

/// Encodes link ids into short opaque tokens and back.
///
/// Implementations must be deterministic: `decode(&encode(id)) == Some(id)` for every
/// non-negative id, and `decode` returns `None` for any token the encoder could
/// not have produced.
///
/// # Implementations
///
/// - [`crate::infrastructure::hash_id::HarshCodec`] - hashids via the `harsh` crate
#[cfg_attr(test, mockall::automock)]
pub trait HashIdCodec: Send + Sync {
    /// Encodes a primary key.
    fn encode(&self, id: i64) -> String;

    /// Decodes a token back into a primary key.
    fn decode(&self, token: &str) -> Option<i64>;
}
