use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::{hash_password, verify_password};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub fullname: String,
    /// 密码哈希，永不序列化到响应
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 当前有效的刷新令牌，每个账号同时只有一个会话
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: &str,
        email: &str,
        fullname: &str,
        avatar_url: &str,
        cover_image_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            // 用户名和邮箱统一小写存储
            username: username.trim().to_lowercase(),
            email: email.trim().to_lowercase(),
            fullname: fullname.trim().to_string(),
            password_hash: String::new(),
            refresh_token: None,
            avatar_url: avatar_url.to_string(),
            cover_image_url,
            created_at: Utc::now(),
        }
    }

    /// 设置密码时立即哈希，所有修改密码的写路径都经过这里
    pub fn set_password(&mut self, plain: &str) -> Result<(), AppError> {
        self.password_hash = hash_password(plain)?;
        Ok(())
    }

    pub fn verify_password(&self, plain: &str) -> Result<bool, AppError> {
        Ok(verify_password(plain, &self.password_hash)?)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// 按小写规范化后的用户名查找
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// 持久化可变字段（昵称、密码哈希、刷新令牌、图片地址）
    async fn save(&self, user: &User) -> Result<User, AppError>;

    async fn update_refresh_token(&self, id: &str, token: Option<&str>) -> Result<(), AppError>;
}
