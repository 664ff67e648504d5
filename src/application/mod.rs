//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls with input processing. They consume
//! repository traits and give HTTP handlers and the admin CLI a single API.
//!
//! # Available Services
//!
//! - [`services::input_processor::LinkInputProcessor`] - Hash canonicalization and URL normalization
//! - [`services::link_service::LinkService`] - Link creation, lookup and maintenance
//! - [`services::user_service::UserService`] - Link owners

pub mod services;
