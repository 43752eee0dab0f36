//! 测试用内存存储，行为与Postgres实现保持一致

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppError;
use crate::store::subscription::{Subscription, SubscriptionStore};
use crate::store::user::{User, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subscription(&self, subscriber_id: &str, channel_id: &str) {
        self.subscriptions.lock().unwrap().push(Subscription {
            subscriber_id: subscriber_id.to_string(),
            channel_id: channel_id.to_string(),
        });
    }

    pub fn stored_refresh_token(&self, id: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .and_then(|u| u.refresh_token.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| {
                username.is_some_and(|n| u.username == n) || email.is_some_and(|m| u.email == m)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        // 与数据库唯一约束一致
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::UserAlreadyExists);
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::StoreUnavailable)?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn update_refresh_token(&self, id: &str, token: Option<&str>) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.refresh_token = token.map(str::to_string);
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn subscribers_of(&self, channel_id: &str) -> Result<Vec<Subscription>, AppError> {
        let edges = self.subscriptions.lock().unwrap();
        Ok(edges
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .cloned()
            .collect())
    }

    async fn subscriptions_of(&self, subscriber_id: &str) -> Result<Vec<Subscription>, AppError> {
        let edges = self.subscriptions.lock().unwrap();
        Ok(edges
            .iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .cloned()
            .collect())
    }
}
