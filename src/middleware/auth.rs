use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{AppState, error::AppError, token::TokenKind};

/// 认证中间件：从Cookie或Authorization头取访问令牌，
/// 校验通过后把Claims放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());

    let token = jar
        .get("accessToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_string)
        })
        .ok_or(AppError::MissingToken)?;

    let claims = state.tokens.verify(&token, TokenKind::Access)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
