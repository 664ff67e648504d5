#![allow(dead_code)]

use axum_test::TestServer;
use link_shortener::application::services::LinkInputProcessor;
use link_shortener::domain::base_url::BaseUrl;
use link_shortener::domain::codec::HashIdCodec;
use link_shortener::infrastructure::hash_id::HarshCodec;
use link_shortener::infrastructure::persistence::{
    InMemoryLinkRepository, InMemoryUserRepository, PgLinkRepository, PgUserRepository,
};
use link_shortener::routes::router;
use link_shortener::state::AppState;
use link_shortener::utils::url_normalizer::HttpsUrlNormalizer;
use sqlx::PgPool;
use std::sync::Arc;

pub const BASE_URL: &str = "https://sho.rt";
pub const HASH_MIN_LENGTH: usize = 5;

pub fn codec() -> HarshCodec {
    HarshCodec::new("sho.rt", HASH_MIN_LENGTH).unwrap()
}

pub fn encode(id: i64) -> String {
    codec().encode(id)
}

pub fn processor() -> Arc<LinkInputProcessor> {
    Arc::new(LinkInputProcessor::new(
        Arc::new(codec()),
        Arc::new(HttpsUrlNormalizer),
        BaseUrl::parse(BASE_URL).unwrap(),
        HASH_MIN_LENGTH,
    ))
}

pub fn create_memory_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryLinkRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        processor(),
    )
}

pub fn create_pg_state(pool: PgPool) -> AppState {
    let pool = Arc::new(pool);

    AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        processor(),
    )
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state, false)).unwrap()
}

pub fn memory_server() -> TestServer {
    test_server(create_memory_state())
}

pub async fn create_test_user(pool: &PgPool, username: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}
