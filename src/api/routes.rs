//! API route configuration.

use crate::api::handlers::{
    create_link_handler, create_user_handler, delete_link_handler, find_link_by_url_handler,
    get_link_handler, get_user_handler, update_link_handler, user_links_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST   /links`             - Create a link
/// - `GET    /links?url=...`     - Find the link for a URL
/// - `GET    /links/{token}`     - Resolve a hash id or custom hash
/// - `PATCH  /links/{token}`     - Partially update a link
/// - `DELETE /links/{token}`     - Delete a link
/// - `POST   /users`             - Create a user
/// - `GET    /users/{id}`        - Get a user
/// - `GET    /users/{id}/links`  - List a user's links
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/links",
            post(create_link_handler).get(find_link_by_url_handler),
        )
        .route(
            "/links/{token}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/users", post(create_user_handler))
        .route("/users/{id}", get(get_user_handler))
        .route("/users/{id}/links", get(user_links_handler))
}
