//! Link creation, lookup and maintenance service.

use std::sync::Arc;

use metrics::counter;
use serde_json::json;

use crate::application::services::input_processor::{LinkInput, LinkInputProcessor};
use crate::domain::entities::{Link, LinkChanges, NewLink};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;
use crate::utils::hash_canonical::canonicalize_hash;

/// Request to create a link. Fields are raw, as submitted.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub hash: Option<String>,
    pub creator_id: Option<i64>,
}

/// Partial update of a link. Fields are raw, as submitted.
///
/// `hash: Some(None)` (or an empty string) removes the custom hash.
#[derive(Debug, Clone, Default)]
pub struct UpdateLink {
    pub hash: Option<Option<String>>,
    pub original_url: Option<String>,
}

/// Result of [`LinkService::create_link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Created(Link),
    /// An equivalent unbranded link already existed and was returned instead.
    Existing(Link),
}

impl LinkOutcome {
    pub fn link(&self) -> &Link {
        match self {
            LinkOutcome::Created(link) | LinkOutcome::Existing(link) => link,
        }
    }

    pub fn into_link(self) -> Link {
        match self {
            LinkOutcome::Created(link) | LinkOutcome::Existing(link) => link,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, LinkOutcome::Created(_))
    }
}

/// Service for creating, resolving and maintaining links.
///
/// Every write passes through the [`LinkInputProcessor`], so repositories only
/// ever see canonical hashes and normalized URLs.
pub struct LinkService<L: LinkRepository + ?Sized, U: UserRepository + ?Sized> {
    link_repository: Arc<L>,
    user_repository: Arc<U>,
    processor: Arc<LinkInputProcessor>,
}

impl<L: LinkRepository + ?Sized, U: UserRepository + ?Sized> LinkService<L, U> {
    pub fn new(
        link_repository: Arc<L>,
        user_repository: Arc<U>,
        processor: Arc<LinkInputProcessor>,
    ) -> Self {
        Self {
            link_repository,
            user_repository,
            processor,
        }
    }

    pub fn processor(&self) -> &LinkInputProcessor {
        &self.processor
    }

    /// Creates a link.
    ///
    /// # Deduplication
    ///
    /// When no custom hash is requested and the same creator already has an
    /// unbranded link to the same normalized URL, that link is returned as
    /// [`LinkOutcome::Existing`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - the URL is missing or invalid, or points at the service itself
    /// - the custom hash is invalid or decodes to a hash id
    /// - `creator_id` does not reference an existing user
    ///
    /// Returns [`AppError::Conflict`] if the custom hash is already taken.
    pub async fn create_link(&self, request: CreateLink) -> Result<LinkOutcome, AppError> {
        let processed = self.processor.process(LinkInput {
            hash: request.hash,
            original_url: Some(request.original_url),
        })?;

        let original_url = processed.original_url.ok_or_else(|| {
            AppError::bad_request(
                "Original URL is required",
                json!({ "field": "original_url" }),
            )
        })?;

        if let Some(creator_id) = request.creator_id {
            self.ensure_user_exists(creator_id).await?;
        }

        match processed.hash {
            Some(ref hash) => self.ensure_hash_free(hash, None).await?,
            None => {
                if let Some(existing) = self
                    .link_repository
                    .find_unbranded_by_original_url(&original_url, request.creator_id)
                    .await?
                {
                    tracing::debug!(link_id = existing.id, "Reusing existing link");
                    return Ok(LinkOutcome::Existing(existing));
                }
            }
        }

        let link = self
            .link_repository
            .create(NewLink {
                hash: processed.hash,
                original_url,
                creator_id: request.creator_id,
            })
            .await?;

        counter!("links_created_total").increment(1);
        tracing::info!(
            link_id = link.id,
            hash = link.hash.as_deref(),
            url = %link.original_url,
            "Link created"
        );

        Ok(LinkOutcome::Created(link))
    }

    /// Resolves a public identifier.
    ///
    /// A token that decodes to an id is looked up by primary key; anything else
    /// is canonicalized and looked up as a custom hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn find_by_hash_id(&self, token: &str) -> Result<Option<Link>, AppError> {
        if let Some(id) = self.processor.decode_hash_id(token) {
            tracing::debug!(token, id, "Resolving hash id");
            return self.link_repository.find_by_id(id).await;
        }

        let hash = canonicalize_hash(token);
        if hash.is_empty() {
            return Ok(None);
        }

        tracing::debug!(token, hash = %hash, "Resolving custom hash");
        self.link_repository.find_by_hash(&hash).await
    }

    /// Like [`Self::find_by_hash_id`] but a missing link is an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing matches the token.
    pub async fn get_by_hash_id(&self, token: &str) -> Result<Link, AppError> {
        self.find_by_hash_id(token)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "token": token })))
    }

    /// Finds the oldest link to `url`, after normalizing it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL cannot be normalized.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<Link>, AppError> {
        let normalized = self.processor.normalize_url(url)?;
        tracing::debug!(url = %normalized, "Looking up link by URL");
        self.link_repository.find_by_original_url(&normalized).await
    }

    /// Like [`Self::find_by_url`] but a missing link is an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link points at the URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Link, AppError> {
        self.find_by_url(url)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "url": url })))
    }

    /// Updates the link identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token matches nothing,
    /// [`AppError::Validation`] for rejected input and
    /// [`AppError::Conflict`] if the new hash belongs to another link.
    pub async fn update_link(&self, token: &str, request: UpdateLink) -> Result<Link, AppError> {
        let link = self.get_by_hash_id(token).await?;

        let processed = self.processor.process(LinkInput {
            hash: request.hash.clone().flatten(),
            original_url: request.original_url,
        })?;

        let changes = LinkChanges {
            hash: request.hash.map(|_| processed.hash),
            original_url: processed.original_url,
        };

        if changes.is_empty() {
            return Ok(link);
        }

        if let Some(Some(hash)) = &changes.hash {
            self.ensure_hash_free(hash, Some(link.id)).await?;
        }

        let updated = self.link_repository.update(link.id, changes).await?;
        tracing::info!(link_id = updated.id, "Link updated");

        Ok(updated)
    }

    /// Deletes the link identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token matches nothing.
    pub async fn delete_link(&self, token: &str) -> Result<(), AppError> {
        let link = self.get_by_hash_id(token).await?;

        if !self.link_repository.delete(link.id).await? {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "token": token }),
            ));
        }

        tracing::info!(link_id = link.id, "Link deleted");
        Ok(())
    }

    /// Lists a user's links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn list_links_for_user(&self, user_id: i64) -> Result<Vec<Link>, AppError> {
        if self.user_repository.find_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found(
                "User not found",
                json!({ "user_id": user_id }),
            ));
        }

        self.link_repository.list_by_creator(user_id).await
    }

    pub async fn count_links(&self) -> Result<i64, AppError> {
        self.link_repository.count().await
    }

    pub fn hash_id(&self, link: &Link) -> String {
        link.hash_id(self.processor.codec())
    }

    pub fn shortened_url(&self, link: &Link) -> String {
        link.shortened_url(self.processor.base_url(), self.processor.codec())
    }

    pub fn branded_url(&self, link: &Link) -> Option<String> {
        link.branded_url(self.processor.base_url())
    }

    async fn ensure_user_exists(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_repository.find_by_id(user_id).await?.is_none() {
            return Err(AppError::bad_request(
                "Creator does not exist",
                json!({ "creator_id": user_id }),
            ));
        }
        Ok(())
    }

    async fn ensure_hash_free(&self, hash: &str, owner: Option<i64>) -> Result<(), AppError> {
        match self.link_repository.find_by_hash(hash).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict(
                "Hash is already in use",
                json!({ "hash": hash }),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::base_url::BaseUrl;
    use crate::domain::codec::MockHashIdCodec;
    use crate::domain::entities::User;
    use crate::domain::repositories::{MockLinkRepository, MockUserRepository};
    use crate::utils::url_normalizer::HttpsUrlNormalizer;
    use chrono::Utc;

    const ENCODED_42: &str = "xkpqz";

    fn codec() -> MockHashIdCodec {
        let mut codec = MockHashIdCodec::new();
        codec
            .expect_decode()
            .returning(|token| (token == ENCODED_42).then_some(42));
        codec.expect_encode().returning(|id| format!("enc{id}"));
        codec
    }

    fn processor() -> Arc<LinkInputProcessor> {
        Arc::new(LinkInputProcessor::new(
            Arc::new(codec()),
            Arc::new(HttpsUrlNormalizer),
            BaseUrl::parse("https://sho.rt").unwrap(),
            5,
        ))
    }

    fn service(
        links: MockLinkRepository,
        users: MockUserRepository,
    ) -> LinkService<MockLinkRepository, MockUserRepository> {
        LinkService::new(Arc::new(links), Arc::new(users), processor())
    }

    fn test_link(id: i64, hash: Option<&str>, url: &str) -> Link {
        let now = Utc::now();
        Link::new(id, hash.map(str::to_string), url.to_string(), None, now, now)
    }

    #[tokio::test]
    async fn test_create_link_normalizes_url() {
        let mut links = MockLinkRepository::new();

        links
            .expect_find_unbranded_by_original_url()
            .withf(|url, creator_id| url == "https://example.com/Path" && creator_id.is_none())
            .times(1)
            .returning(|_, _| Ok(None));

        links
            .expect_create()
            .withf(|new_link| {
                new_link.original_url == "https://example.com/Path" && new_link.hash.is_none()
            })
            .times(1)
            .returning(|new_link| Ok(test_link(1, None, &new_link.original_url)));

        let service = service(links, MockUserRepository::new());

        let outcome = service
            .create_link(CreateLink {
                original_url: "HTTP://Example.com/Path".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(outcome.is_created());
        assert_eq!(outcome.link().original_url, "https://example.com/Path");
    }

    #[tokio::test]
    async fn test_create_link_deduplicates_unbranded() {
        let mut links = MockLinkRepository::new();

        links
            .expect_find_unbranded_by_original_url()
            .times(1)
            .returning(|url, _| Ok(Some(test_link(5, None, url))));
        links.expect_create().times(0);

        let service = service(links, MockUserRepository::new());

        let outcome = service
            .create_link(CreateLink {
                original_url: "example.com".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!outcome.is_created());
        assert_eq!(outcome.link().id, 5);
    }

    #[tokio::test]
    async fn test_create_link_with_hash_skips_dedup() {
        let mut links = MockLinkRepository::new();

        links.expect_find_unbranded_by_original_url().times(0);
        links
            .expect_find_by_hash()
            .withf(|hash| hash == "springSale")
            .times(1)
            .returning(|_| Ok(None));
        links
            .expect_create()
            .withf(|new_link| new_link.hash.as_deref() == Some("springSale"))
            .times(1)
            .returning(|new_link| {
                Ok(test_link(
                    2,
                    new_link.hash.as_deref(),
                    &new_link.original_url,
                ))
            });

        let service = service(links, MockUserRepository::new());

        let outcome = service
            .create_link(CreateLink {
                original_url: "https://example.com".to_string(),
                hash: Some("Spring Sale".to_string()),
                creator_id: None,
            })
            .await
            .unwrap();

        let link = outcome.into_link();
        assert_eq!(link.hash.as_deref(), Some("springSale"));
        assert_eq!(
            service.branded_url(&link).as_deref(),
            Some("https://sho.rt/springSale")
        );
        assert_eq!(service.shortened_url(&link), "https://sho.rt/enc2");
    }

    #[tokio::test]
    async fn test_create_link_hash_conflict() {
        let mut links = MockLinkRepository::new();

        links
            .expect_find_by_hash()
            .times(1)
            .returning(|hash| Ok(Some(test_link(9, Some(hash), "https://other.com"))));
        links.expect_create().times(0);

        let service = service(links, MockUserRepository::new());

        let result = service
            .create_link(CreateLink {
                original_url: "https://example.com".to_string(),
                hash: Some("taken".to_string()),
                creator_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_link_rejects_hash_decoding_to_id() {
        let mut links = MockLinkRepository::new();
        links.expect_create().times(0);

        let service = service(links, MockUserRepository::new());

        let err = service
            .create_link(CreateLink {
                original_url: "https://example.com".to_string(),
                hash: Some(ENCODED_42.to_string()),
                creator_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), format!("Cannot use hash {ENCODED_42}"));
    }

    #[tokio::test]
    async fn test_create_link_rejects_own_domain() {
        let service = service(MockLinkRepository::new(), MockUserRepository::new());

        let err = service
            .create_link(CreateLink {
                original_url: "http://sho.rt/abcde".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Cannot shorten sho.rt URLs");
    }

    #[tokio::test]
    async fn test_create_link_requires_url() {
        let service = service(MockLinkRepository::new(), MockUserRepository::new());

        let result = service.create_link(CreateLink::default()).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_link_unknown_creator() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .withf(|id| *id == 77)
            .times(1)
            .returning(|_| Ok(None));

        let service = service(MockLinkRepository::new(), users);

        let result = service
            .create_link(CreateLink {
                original_url: "https://example.com".to_string(),
                hash: None,
                creator_id: Some(77),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_link_with_creator() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(User::new(id, "alice".to_string(), Utc::now()))));

        let mut links = MockLinkRepository::new();
        links
            .expect_find_unbranded_by_original_url()
            .withf(|_, creator_id| *creator_id == Some(3))
            .times(1)
            .returning(|_, _| Ok(None));
        links
            .expect_create()
            .withf(|new_link| new_link.creator_id == Some(3))
            .times(1)
            .returning(|new_link| {
                let mut link = test_link(4, None, &new_link.original_url);
                link.creator_id = new_link.creator_id;
                Ok(link)
            });

        let service = service(links, users);

        let outcome = service
            .create_link(CreateLink {
                original_url: "https://example.com".to_string(),
                hash: None,
                creator_id: Some(3),
            })
            .await
            .unwrap();

        assert!(outcome.is_created());
        assert_eq!(outcome.link().creator_id, Some(3));
    }

    #[tokio::test]
    async fn test_find_by_hash_id_decodes_token() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|id| Ok(Some(test_link(id, None, "https://example.com"))));
        links.expect_find_by_hash().times(0);

        let service = service(links, MockUserRepository::new());

        let link = service.find_by_hash_id(ENCODED_42).await.unwrap().unwrap();
        assert_eq!(link.id, 42);
    }

    #[tokio::test]
    async fn test_find_by_hash_id_falls_back_to_canonical_hash() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_id().times(0);
        links
            .expect_find_by_hash()
            .withf(|hash| hash == "springSale")
            .times(1)
            .returning(|hash| Ok(Some(test_link(3, Some(hash), "https://example.com"))));

        let service = service(links, MockUserRepository::new());

        let link = service
            .find_by_hash_id("spring-sale")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.hash.as_deref(), Some("springSale"));
    }

    #[tokio::test]
    async fn test_find_by_hash_id_empty_canonical_form() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_hash().times(0);

        let service = service(links, MockUserRepository::new());

        assert!(service.find_by_hash_id("--").await.unwrap().is_none());
        assert!(matches!(
            service.get_by_hash_id("--").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_by_url_normalizes_input() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_original_url()
            .withf(|url| url == "https://example.com/Path")
            .times(1)
            .returning(|url| Ok(Some(test_link(1, None, url))));

        let service = service(links, MockUserRepository::new());

        let link = service
            .get_by_url("http://www.EXAMPLE.com/Path/?utm_source=x")
            .await
            .unwrap();
        assert_eq!(link.id, 1);
    }

    #[tokio::test]
    async fn test_find_by_url_invalid_input() {
        let service = service(MockLinkRepository::new(), MockUserRepository::new());

        let result = service.find_by_url("ftp://example.com").await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_link_clears_hash() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_hash()
            .withf(|hash| hash == "springSale")
            .returning(|hash| Ok(Some(test_link(3, Some(hash), "https://example.com"))));
        links
            .expect_update()
            .withf(|id, changes| *id == 3 && changes.hash == Some(None))
            .times(1)
            .returning(|id, _| Ok(test_link(id, None, "https://example.com")));

        let service = service(links, MockUserRepository::new());

        let updated = service
            .update_link(
                "springSale",
                UpdateLink {
                    hash: Some(None),
                    original_url: None,
                },
            )
            .await
            .unwrap();

        assert!(updated.hash.is_none());
    }

    #[tokio::test]
    async fn test_update_link_processes_fields() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, None, "https://example.com"))));
        links
            .expect_find_by_hash()
            .withf(|hash| hash == "newName")
            .times(1)
            .returning(|_| Ok(None));
        links
            .expect_update()
            .withf(|_, changes| {
                changes.hash == Some(Some("newName".to_string()))
                    && changes.original_url.as_deref() == Some("https://other.org")
            })
            .times(1)
            .returning(|id, changes| {
                Ok(test_link(
                    id,
                    changes.hash.clone().flatten().as_deref(),
                    changes.original_url.as_deref().unwrap_or_default(),
                ))
            });

        let service = service(links, MockUserRepository::new());

        let updated = service
            .update_link(
                ENCODED_42,
                UpdateLink {
                    hash: Some(Some("New Name".to_string())),
                    original_url: Some("www.other.org/".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, 42);
        assert_eq!(updated.hash.as_deref(), Some("newName"));
    }

    #[tokio::test]
    async fn test_update_link_no_changes() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, None, "https://example.com"))));
        links.expect_update().times(0);

        let service = service(links, MockUserRepository::new());

        let link = service
            .update_link(ENCODED_42, UpdateLink::default())
            .await
            .unwrap();
        assert_eq!(link.id, 42);
    }

    #[tokio::test]
    async fn test_update_link_hash_taken_by_other_link() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, None, "https://example.com"))));
        links
            .expect_find_by_hash()
            .returning(|hash| Ok(Some(test_link(8, Some(hash), "https://other.com"))));
        links.expect_update().times(0);

        let service = service(links, MockUserRepository::new());

        let result = service
            .update_link(
                ENCODED_42,
                UpdateLink {
                    hash: Some(Some("taken".to_string())),
                    original_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_link() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, None, "https://example.com"))));
        links
            .expect_delete()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|_| Ok(true));

        let service = service(links, MockUserRepository::new());

        assert!(service.delete_link(ENCODED_42).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_id().returning(|_| Ok(None));
        links.expect_delete().times(0);

        let service = service(links, MockUserRepository::new());

        assert!(matches!(
            service.delete_link(ENCODED_42).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_links_for_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let mut links = MockLinkRepository::new();
        links.expect_list_by_creator().times(0);

        let service = service(links, users);

        assert!(matches!(
            service.list_links_for_user(1).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
