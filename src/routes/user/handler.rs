use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    AppState,
    error::AppError,
    session::Registration,
    token::Claims,
    utils::success_to_api_response,
};

use super::model::{
    ChangePasswordRequest, ChangePasswordResponse, LoginRequest, LoginResponse, LogoutResponse,
    RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
};

fn token_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .sessions
        .register(Registration {
            username: req.username,
            email: req.email,
            fullname: req.fullname,
            password: req.password,
            avatar_url: req.avatar_url,
            cover_image_url: req.cover_image_url,
        })
        .await?;

    tracing::info!("registered user {}", user.username);
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .sessions
        .login(req.username.as_deref(), req.email.as_deref(), &req.password)
        .await?;

    // 令牌写入Cookie，同时放入响应体供非浏览器客户端使用
    let jar = jar
        .add(token_cookie("accessToken", outcome.access_token.clone()))
        .add(token_cookie("refreshToken", outcome.refresh_token.clone()));

    Ok((
        jar,
        success_to_api_response(LoginResponse {
            user: outcome.user,
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token,
        }),
    ))
}

#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<impl IntoResponse, AppError> {
    // 优先取Cookie，缺失时退回请求体字段
    let presented = jar
        .get("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(req)| req.refresh_token));

    let tokens = state.sessions.refresh(presented.as_deref()).await?;

    // 每个Cookie写入与其同名的令牌
    let jar = jar
        .add(token_cookie("accessToken", tokens.access_token.clone()))
        .add(token_cookie("refreshToken", tokens.refresh_token.clone()));

    Ok((
        jar,
        success_to_api_response(RefreshTokenResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.logout(&claims.sub).await?;

    let jar = jar
        .remove(clear_cookie("accessToken"))
        .remove(clear_cookie("refreshToken"));

    Ok((jar, success_to_api_response(LogoutResponse {})))
}

#[axum::debug_handler]
pub async fn current_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn change_password(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .sessions
        .change_password(&claims.sub, &req.old_password, &req.new_password)
        .await?;

    Ok(success_to_api_response(ChangePasswordResponse {}))
}
