use std::sync::Arc;

use config::Config;

pub mod channel;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod store;
pub mod token;
pub mod utils;

use channel::ChannelProfileResolver;
use session::SessionManager;
use store::{SubscriptionStore, UserStore};
use token::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub sessions: SessionManager,
    pub channels: ChannelProfileResolver,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        let tokens = TokenService::new(&config);
        let sessions = SessionManager::new(users.clone(), tokens.clone());
        let channels = ChannelProfileResolver::new(users.clone(), subscriptions);
        Self {
            config,
            users,
            tokens,
            sessions,
            channels,
        }
    }
}
