//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a hash id or custom hash to its original URL.
///
/// # Endpoint
///
/// `GET /{token}`
///
/// # Resolution
///
/// 1. Token decodes to an id → link with that id
/// 2. Otherwise → link whose canonical custom hash matches
///
/// Responds with 307 Temporary Redirect so destinations can be changed later.
///
/// # Errors
///
/// Returns 404 Not Found if the token matches nothing.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let link = state.link_service.get_by_hash_id(&token).await?;

    tracing::debug!(token, link_id = link.id, "Redirecting");

    Ok(Redirect::temporary(&link.original_url))
}
