//! Handlers for user endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::LinkResponse;
use crate::api::dto::user::{CreateUserRequest, UserResponse};
use crate::api::handlers::links::link_response;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a user.
///
/// # Endpoint
///
/// `POST /api/users`
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid username.
/// Returns 409 Conflict if the username is taken.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    let user = state.user_service.create_user(&payload.username).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /api/users/{id}`
pub async fn get_user_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get_user(id).await?;

    Ok(Json(user.into()))
}

/// Lists a user's links, newest first.
///
/// # Endpoint
///
/// `GET /api/users/{id}/links`
///
/// # Errors
///
/// Returns 404 Not Found if the user does not exist.
pub async fn user_links_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_links_for_user(id).await?;

    Ok(Json(
        links
            .into_iter()
            .map(|link| link_response(&state, link))
            .collect(),
    ))
}
