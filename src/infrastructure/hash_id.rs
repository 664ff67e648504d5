//! Hashids-based [`HashIdCodec`] implementation.

use harsh::Harsh;

use crate::domain::codec::HashIdCodec;

/// Errors raised while building the codec.
#[derive(Debug, thiserror::Error)]
pub enum HashIdError {
    #[error("Failed to build hash id codec: {0}")]
    Build(String),
}

/// Encodes link ids with hashids, salted with the service host.
///
/// Encoded values are at least `min_length` characters long.
pub struct HarshCodec {
    harsh: Harsh,
}

impl HarshCodec {
    /// Builds a codec for the given salt (the service host) and minimum length.
    ///
    /// # Errors
    ///
    /// Returns [`HashIdError::Build`] if `harsh` rejects the configuration.
    pub fn new(salt: &str, min_length: usize) -> Result<Self, HashIdError> {
        let harsh = Harsh::builder()
            .salt(salt)
            .length(min_length)
            .build()
            .map_err(|e| HashIdError::Build(e.to_string()))?;

        Ok(Self { harsh })
    }
}

impl HashIdCodec for HarshCodec {
    fn encode(&self, id: i64) -> String {
        // Primary keys come from BIGSERIAL and are never negative.
        self.harsh.encode(&[id.max(0) as u64])
    }

    fn decode(&self, token: &str) -> Option<i64> {
        if token.is_empty() {
            return None;
        }

        let values = self.harsh.decode(token).ok()?;
        let [value] = values.as_slice() else {
            return None;
        };

        let id = i64::try_from(*value).ok()?;

        // Only tokens the encoder itself produces count as ids.
        (self.encode(id) == token).then_some(id)
    }
}

impl std::fmt::Debug for HarshCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarshCodec").finish_non_exhaustive()
    }
}
