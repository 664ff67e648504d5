//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkInputProcessor, LinkService, UserService};
use crate::domain::repositories::{LinkRepository, UserRepository};

/// Link service over whichever storage backend the server was started with.
pub type DynLinkService = LinkService<dyn LinkRepository, dyn UserRepository>;

/// User service over whichever storage backend the server was started with.
pub type DynUserService = UserService<dyn UserRepository>;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub user_service: Arc<DynUserService>,
}

impl AppState {
    /// Wires the services around a pair of repositories.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        user_repository: Arc<dyn UserRepository>,
        processor: Arc<LinkInputProcessor>,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(
            link_repository,
            user_repository.clone(),
            processor,
        ));
        let user_service = Arc::new(UserService::new(user_repository));

        Self {
            link_service,
            user_service,
        }
    }
}
