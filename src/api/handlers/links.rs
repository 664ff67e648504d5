//! Handlers for link endpoints (create, look up, update, delete).

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, LinkResponse, UpdateLinkRequest, UrlQuery};
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

/// Builds the JSON representation of `link`, including derived URLs.
pub(crate) fn link_response(state: &AppState, link: Link) -> LinkResponse {
    let service = &state.link_service;
    let hash_id = service.hash_id(&link);
    let shortened_url = service.shortened_url(&link);
    let branded_url = service.branded_url(&link);

    LinkResponse::new(link, hash_id, shortened_url, branded_url)
}

/// Creates a link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "example.com/spring",
///   "hash": "Spring Sale",   // optional
///   "creator_id": 1          // optional
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: New link
/// - **200 OK**: An identical unbranded link already existed
/// - **400 Bad Request**: Rejected hash or URL
/// - **409 Conflict**: Custom hash already taken
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let outcome = state.link_service.create_link(payload.into()).await?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(link_response(&state, outcome.into_link()))))
}

/// Finds the link for a URL.
///
/// # Endpoint
///
/// `GET /api/links?url=...`
///
/// The URL is normalized first, so any equivalent spelling matches.
///
/// # Errors
///
/// Returns 400 Bad Request if `url` is missing or malformed.
/// Returns 404 Not Found if no link points at the URL.
pub async fn find_link_by_url_handler(
    State(state): State<AppState>,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request(
            "Query parameter 'url' is required",
            json!({ "reason": e.body_text() }),
        )
    })?;

    let link = state.link_service.get_by_url(&query.url).await?;

    Ok(Json(link_response(&state, link)))
}

/// Returns the link behind a hash id or custom hash.
///
/// # Endpoint
///
/// `GET /api/links/{token}`
///
/// # Errors
///
/// Returns 404 Not Found if the token matches nothing.
pub async fn get_link_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_by_hash_id(&token).await?;

    Ok(Json(link_response(&state, link)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /api/links/{token}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed.
///
/// ```json
/// {
///   "original_url": "https://new-destination.com",
///   "hash": null   // removes the custom hash
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the token matches nothing.
/// Returns 400 Bad Request if a field is rejected.
/// Returns 409 Conflict if the new hash belongs to another link.
pub async fn update_link_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(&token, payload.into())
        .await?;

    Ok(Json(link_response(&state, link)))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{token}`
///
/// # Errors
///
/// Returns 404 Not Found if the token matches nothing.
pub async fn delete_link_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}
