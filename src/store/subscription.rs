use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;

use crate::error::AppError;

/// 订阅关系：subscriber 订阅了 channel，边不去重
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscription {
    pub subscriber_id: String,
    pub channel_id: String,
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync + 'static {
    /// 订阅了该频道的所有边
    async fn subscribers_of(&self, channel_id: &str) -> Result<Vec<Subscription>, AppError>;

    /// 该用户订阅出去的所有边
    async fn subscriptions_of(&self, subscriber_id: &str) -> Result<Vec<Subscription>, AppError>;
}
