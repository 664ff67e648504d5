//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`hash_id`] - Hashids codec for link ids
//! - [`persistence`] - PostgreSQL and in-memory repositories

pub mod hash_id;
pub mod persistence;
