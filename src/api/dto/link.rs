//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{CreateLink, UpdateLink};
use crate::domain::entities::Link;

/// Request body for `POST /api/links`.
///
/// `original_url` may omit the scheme; it is normalized before storage.
/// `hash` is free-form and canonicalized to camel case (`"Spring Sale"` → `springSale`).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub original_url: String,

    #[validate(length(max = 255))]
    pub hash: Option<String>,

    #[validate(range(min = 1))]
    pub creator_id: Option<i64>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(r: CreateLinkRequest) -> Self {
        CreateLink {
            original_url: r.original_url,
            hash: r.hash,
            creator_id: r.creator_id,
        }
    }
}

/// Request body for `PATCH /api/links/{token}`.
///
/// # `hash` semantics
///
/// - **Absent** → leave the custom hash unchanged
/// - **`null`** or `""` → remove the custom hash
/// - **String** → set a new custom hash
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub hash: Option<Option<String>>,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub original_url: Option<String>,
}

impl From<UpdateLinkRequest> for UpdateLink {
    fn from(r: UpdateLinkRequest) -> Self {
        UpdateLink {
            hash: r.hash,
            original_url: r.original_url,
        }
    }
}

/// Query for `GET /api/links?url=...`.
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

/// JSON representation of a link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub hash_id: String,
    pub hash: Option<String>,
    pub original_url: String,
    pub shortened_url: String,
    pub branded_url: Option<String>,
    pub creator_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    /// Combines a link with its derived identifiers.
    pub fn new(
        link: Link,
        hash_id: String,
        shortened_url: String,
        branded_url: Option<String>,
    ) -> Self {
        Self {
            id: link.id,
            hash_id,
            hash: link.hash,
            original_url: link.original_url,
            shortened_url,
            branded_url,
            creator_id: link.creator_id,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_hash_absent_null_and_value() {
        let absent: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.hash, None);

        let null: UpdateLinkRequest = serde_json::from_str(r#"{"hash": null}"#).unwrap();
        assert_eq!(null.hash, Some(None));

        let value: UpdateLinkRequest = serde_json::from_str(r#"{"hash": "Spring Sale"}"#).unwrap();
        assert_eq!(value.hash, Some(Some("Spring Sale".to_string())));
    }

    #[test]
    fn test_create_request_validation() {
        let empty = CreateLinkRequest {
            original_url: String::new(),
            hash: None,
            creator_id: None,
        };
        assert!(empty.validate().is_err());

        let bad_creator = CreateLinkRequest {
            original_url: "example.com".to_string(),
            hash: None,
            creator_id: Some(0),
        };
        assert!(bad_creator.validate().is_err());

        let ok = CreateLinkRequest {
            original_url: "example.com".to_string(),
            hash: Some("Spring Sale".to_string()),
            creator_id: Some(1),
        };
        assert!(ok.validate().is_ok());
    }
}
