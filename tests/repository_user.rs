mod common;

use link_shortener::domain::entities::NewUser;
use link_shortener::domain::repositories::UserRepository;
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_and_find_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let user = repo
        .create(NewUser {
            username: "alice".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(
        repo.find_by_username("alice").await.unwrap(),
        Some(user)
    );
    assert!(repo.find_by_username("bob").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_username_conflicts(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let repo = PgUserRepository::new(Arc::new(pool));

    let result = repo
        .create(NewUser {
            username: "alice".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_deleting_user_keeps_links(pool: PgPool) {
    let user_id = common::create_test_user(&pool, "alice").await;

    sqlx::query("INSERT INTO links (original_url, creator_id) VALUES ($1, $2)")
        .bind("https://example.com")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let creator: Option<i64> = sqlx::query_scalar("SELECT creator_id FROM links")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert!(creator.is_none());
}
