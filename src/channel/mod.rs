use std::sync::Arc;

use serde::Serialize;

use crate::error::AppError;
use crate::store::subscription::SubscriptionStore;
use crate::store::user::UserStore;

/// 频道主页投影，只包含公开展示所需字段
#[derive(Debug, Clone, Serialize)]
pub struct ChannelProfile {
    pub fullname: String,
    pub username: String,
    pub subscriber_count: u64,
    pub channels_subscribed_to_count: u64,
    pub is_subscribed: bool,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub email: String,
}

/// 把用户聚合为频道视图的只读计算，无副作用
#[derive(Clone)]
pub struct ChannelProfileResolver {
    users: Arc<dyn UserStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl ChannelProfileResolver {
    pub fn new(users: Arc<dyn UserStore>, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    pub async fn resolve(
        &self,
        channel_username: &str,
        viewer_id: Option<&str>,
    ) -> Result<ChannelProfile, AppError> {
        let username = channel_username.trim().to_lowercase();
        if username.is_empty() {
            return Err(AppError::MissingUsername);
        }

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(AppError::ChannelNotFound)?;

        // 两次取边，计数与标记在内存中推导；边可能重复，不可去重假设
        let subscribers = self.subscriptions.subscribers_of(&user.id).await?;
        let subscribed_to = self.subscriptions.subscriptions_of(&user.id).await?;

        let is_subscribed = viewer_id
            .map(|viewer| subscribers.iter().any(|s| s.subscriber_id == viewer))
            .unwrap_or(false);

        Ok(ChannelProfile {
            fullname: user.fullname,
            username: user.username,
            subscriber_count: subscribers.len() as u64,
            channels_subscribed_to_count: subscribed_to.len() as u64,
            is_subscribed,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            email: user.email,
        })
    }
}
