//! Business logic services for the application layer.

pub mod input_processor;
pub mod link_service;
pub mod user_service;

pub use input_processor::{LinkInput, LinkInputError, LinkInputProcessor};
pub use link_service::{CreateLink, LinkOutcome, LinkService, UpdateLink};
pub use user_service::UserService;
