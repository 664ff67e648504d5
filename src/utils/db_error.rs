//! Classification of PostgreSQL constraint violations.

/// Unique constraint on `links.hash`.
pub const LINKS_HASH_CONSTRAINT: &str = "links_hash_key";

/// Unique constraint on `users.username`.
pub const USERS_USERNAME_CONSTRAINT: &str = "users_username_key";

/// Returns true if `e` is a unique violation of `constraint`.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}

/// Returns true if `e` is a foreign key violation (e.g. an unknown creator id).
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}
