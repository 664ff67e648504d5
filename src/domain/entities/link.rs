//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

use crate::domain::base_url::BaseUrl;
use crate::domain::codec::HashIdCodec;

/// A shortened link.
///
/// `original_url` is always stored in normalized form and `hash`, when present,
/// is always the canonical form of the custom hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub hash: Option<String>,
    pub original_url: String,
    pub creator_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        hash: Option<String>,
        original_url: String,
        creator_id: Option<i64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            hash,
            original_url,
            creator_id,
            created_at,
            updated_at,
        }
    }

    /// Obfuscated encoding of the primary key.
    pub fn hash_id(&self, codec: &dyn HashIdCodec) -> String {
        codec.encode(self.id)
    }

    /// Short URL built from the hash id.
    pub fn shortened_url(&self, base_url: &BaseUrl, codec: &dyn HashIdCodec) -> String {
        base_url.join(&self.hash_id(codec))
    }

    /// Short URL built from the custom hash, if the link has one.
    pub fn branded_url(&self, base_url: &BaseUrl) -> Option<String> {
        self.hash.as_deref().map(|hash| base_url.join(hash))
    }
}

/// Input data for creating a new link.
///
/// Values must already be canonical/normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub hash: Option<String>,
    pub original_url: String,
    pub creator_id: Option<i64>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `hash: Some(None)` clears the custom hash; `Some(Some(h))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkChanges {
    pub hash: Option<Option<String>>,
    pub original_url: Option<String>,
}

impl LinkChanges {
    /// Returns true if nothing would be modified.
    pub fn is_empty(&self) -> bool {
        self.hash.is_none() && self.original_url.is_none()
    }
}
