//! User registration and lookup.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Service for the users that own links.
pub struct UserService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Registers a user. Usernames are trimmed before being stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the username is blank.
    /// Returns [`AppError::Conflict`] if the username is taken.
    pub async fn create_user(&self, username: &str) -> Result<User, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request(
                "Username must not be empty",
                json!({ "field": "username" }),
            ));
        }

        if self.repository.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(
                "Username is already taken",
                json!({ "username": username }),
            ));
        }

        let user = self
            .repository
            .create(NewUser {
                username: username.to_string(),
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "user_id": id })))
    }
}
