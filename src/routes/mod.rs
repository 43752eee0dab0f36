use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
};

pub mod channel;
pub mod user;

/// 组装路由：公开路由与需认证路由分开挂载
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users/register", post(user::register))
        .route("/users/login", post(user::login))
        // 刷新接口自行校验刷新令牌，不走认证中间件
        .route("/users/refresh-token", post(user::refresh_token));

    let protected_routes = Router::new()
        .route("/users/logout", post(user::logout))
        .route("/users/current", get(user::current_user))
        .route("/users/change-password", post(user::change_password))
        .route("/channels/{username}", get(channel::channel_profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest(
            &state.config.api_base_uri.clone(),
            Router::new().merge(public_routes).merge(protected_routes),
        )
        .layer(axum::middleware::from_fn(log_errors))
        .layer(DefaultBodyLimit::max(16 * 1024))
        .with_state(state)
}
