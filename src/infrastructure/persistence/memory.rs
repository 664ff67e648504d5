//! In-memory repositories.
//!
//! Used when no database is configured and by the HTTP tests.
//! Everything is lost on shutdown.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::entities::{Link, LinkChanges, NewLink, NewUser, User};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;

#[derive(Debug)]
struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Process-local link storage with the same constraints as the `links` table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLinkRepository {
    links: Arc<Mutex<Table<Link>>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_taken(table: &Table<Link>, hash: &str, except_id: Option<i64>) -> bool {
    table
        .rows
        .values()
        .any(|l| l.hash.as_deref() == Some(hash) && Some(l.id) != except_id)
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut table = self.links.lock().await;

        if let Some(hash) = new_link.hash.as_deref()
            && hash_taken(&table, hash, None)
        {
            return Err(AppError::conflict(
                "Hash is already in use",
                json!({ "hash": hash }),
            ));
        }

        let now = Utc::now();
        let link = Link::new(
            table.next_id(),
            new_link.hash,
            new_link.original_url,
            new_link.creator_id,
            now,
            now,
        );
        table.rows.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.links.lock().await.rows.get(&id).cloned())
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .await
            .rows
            .values()
            .find(|l| l.hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<Link>, AppError> {
        // BTreeMap iterates in id order, so the first match is the oldest.
        Ok(self
            .links
            .lock()
            .await
            .rows
            .values()
            .find(|l| l.original_url == original_url)
            .cloned())
    }

    async fn find_unbranded_by_original_url(
        &self,
        original_url: &str,
        creator_id: Option<i64>,
    ) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .await
            .rows
            .values()
            .find(|l| {
                l.original_url == original_url && l.hash.is_none() && l.creator_id == creator_id
            })
            .cloned())
    }

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .await
            .rows
            .values()
            .rev()
            .filter(|l| l.creator_id == Some(creator_id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: LinkChanges) -> Result<Link, AppError> {
        let mut table = self.links.lock().await;

        if let Some(Some(hash)) = changes.hash.as_ref()
            && hash_taken(&table, hash, Some(id))
        {
            return Err(AppError::conflict(
                "Hash is already in use",
                json!({ "hash": hash }),
            ));
        }

        let link = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;

        if let Some(hash) = changes.hash {
            link.hash = hash;
        }
        if let Some(original_url) = changes.original_url {
            link.original_url = original_url;
        }
        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.links.lock().await.rows.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.links.lock().await.rows.len() as i64)
    }
}

/// Process-local user storage.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Table<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut table = self.users.lock().await;

        if table
            .rows
            .values()
            .any(|u| u.username == new_user.username)
        {
            return Err(AppError::conflict(
                "Username is already taken",
                json!({ "username": new_user.username }),
            ));
        }

        let user = User::new(table.next_id(), new_user.username, Utc::now());
        table.rows.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .await
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(hash: Option<&str>, url: &str) -> NewLink {
        NewLink {
            hash: hash.map(str::to_string),
            original_url: url.to_string(),
            creator_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryLinkRepository::new();

        let first = repo.create(new_link(None, "https://a.com")).await.unwrap();
        let second = repo.create(new_link(None, "https://b.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_hash() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link(Some("springSale"), "https://a.com"))
            .await
            .unwrap();

        let result = repo
            .create(new_link(Some("springSale"), "https://b.com"))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_find_unbranded_skips_branded_and_other_creators() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link(Some("branded"), "https://a.com"))
            .await
            .unwrap();
        repo.create(NewLink {
            creator_id: Some(7),
            ..new_link(None, "https://a.com")
        })
        .await
        .unwrap();

        assert!(
            repo.find_unbranded_by_original_url("https://a.com", None)
                .await
                .unwrap()
                .is_none()
        );

        let anonymous = repo.create(new_link(None, "https://a.com")).await.unwrap();

        let found = repo
            .find_unbranded_by_original_url("https://a.com", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, anonymous.id);

        let owned = repo
            .find_unbranded_by_original_url("https://a.com", Some(7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owned.id, 2);
    }

    #[tokio::test]
    async fn test_find_by_original_url_returns_oldest() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link(None, "https://a.com")).await.unwrap();
        repo.create(new_link(Some("branded"), "https://a.com"))
            .await
            .unwrap();

        let found = repo
            .find_by_original_url("https://a.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn test_update_clears_hash() {
        let repo = InMemoryLinkRepository::new();
        let link = repo
            .create(new_link(Some("springSale"), "https://a.com"))
            .await
            .unwrap();

        let updated = repo
            .update(
                link.id,
                LinkChanges {
                    hash: Some(None),
                    original_url: Some("https://b.com".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(updated.hash.is_none());
        assert_eq!(updated.original_url, "https://b.com");
        assert!(repo.find_by_hash("springSale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_link() {
        let repo = InMemoryLinkRepository::new();
        let result = repo.update(99, LinkChanges::default()).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryLinkRepository::new();
        let link = repo.create(new_link(None, "https://a.com")).await.unwrap();

        assert!(repo.delete(link.id).await.unwrap());
        assert!(!repo.delete(link.id).await.unwrap());
        assert!(repo.find_by_id(link.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_creator_newest_first() {
        let repo = InMemoryLinkRepository::new();
        for url in ["https://a.com", "https://b.com"] {
            repo.create(NewLink {
                hash: None,
                original_url: url.to_string(),
                creator_id: Some(3),
            })
            .await
            .unwrap();
        }
        repo.create(new_link(None, "https://c.com")).await.unwrap();

        let links = repo.list_by_creator(3).await.unwrap();
        let urls: Vec<_> = links.iter().map(|l| l.original_url.as_str()).collect();
        assert_eq!(urls, ["https://b.com", "https://a.com"]);
    }

    #[tokio::test]
    async fn test_user_username_unique() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(NewUser {
                username: "alice".to_string(),
            })
            .await
            .unwrap();

        let duplicate = repo
            .create(NewUser {
                username: "alice".to_string(),
            })
            .await;

        assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
        assert_eq!(
            repo.find_by_username("alice").await.unwrap(),
            Some(user.clone())
        );
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user));
    }
}
