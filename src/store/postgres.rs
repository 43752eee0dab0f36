use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::store::subscription::{Subscription, SubscriptionStore};
use crate::store::user::{User, UserStore};

const USER_COLUMNS: &str = "id, username, email, fullname, password_hash, refresh_token, \
     avatar_url, cover_image_url, created_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::text IS NOT NULL AND username = $1)
               OR ($2::text IS NOT NULL AND email = $2)
            "#
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, fullname, password_hash,
                               refresh_token, avatar_url, cover_image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.fullname)
        .bind(&user.password_hash)
        .bind(&user.refresh_token)
        .bind(&user.avatar_url)
        .bind(&user.cover_image_url)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let saved = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET fullname = $2, password_hash = $3, refresh_token = $4,
                avatar_url = $5, cover_image_url = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.id)
        .bind(&user.fullname)
        .bind(&user.password_hash)
        .bind(&user.refresh_token)
        .bind(&user.avatar_url)
        .bind(&user.cover_image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn update_refresh_token(&self, id: &str, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn subscribers_of(&self, channel_id: &str) -> Result<Vec<Subscription>, AppError> {
        let edges = sqlx::query_as::<_, Subscription>(
            "SELECT subscriber_id, channel_id FROM subscriptions WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(edges)
    }

    async fn subscriptions_of(&self, subscriber_id: &str) -> Result<Vec<Subscription>, AppError> {
        let edges = sqlx::query_as::<_, Subscription>(
            "SELECT subscriber_id, channel_id FROM subscriptions WHERE subscriber_id = $1",
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(edges)
    }
}
