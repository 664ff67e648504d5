//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. The only behavior they carry is the
//! derivation of short URLs from already-validated fields.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping
//! - [`User`] - The creator of links
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewLink`, `NewUser` - For creating new records
//! - `LinkChanges` - For partial updates

pub mod link;
pub mod user;

pub use link::{Link, LinkChanges, NewLink};
pub use user::{NewUser, User};
