//! Utility functions for hash handling, URL processing, and storage errors.
//!
//! - [`hash_canonical`] - Custom hash canonicalization and validation
//! - [`url_normalizer`] - URL normalization and sanitization
//! - [`db_error`] - PostgreSQL constraint violation helpers

pub mod db_error;
pub mod hash_canonical;
pub mod url_normalizer;
