//! Domain layer containing business entities and capability contracts.
//!
//! This module defines entities, repository interfaces, and the two external
//! capabilities links depend on, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`base_url`] - The service's own public URL
//! - [`codec`] - Reversible id obfuscation ([`codec::HashIdCodec`])
//! - [`normalizer`] - URL canonicalization ([`normalizer::UrlNormalizer`])
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository and capability traits are implemented by infrastructure/utils
//! - Business logic is encapsulated in services (see [`crate::application::services`])

pub mod base_url;
pub mod codec;
pub mod entities;
pub mod normalizer;
pub mod repositories;
