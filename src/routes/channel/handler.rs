use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
};

use crate::{AppState, error::AppError, token::Claims, utils::success_to_api_response};

/// 频道主页：订阅数、订阅去向数，以及当前观看者是否已订阅
#[axum::debug_handler]
pub async fn channel_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state
        .channels
        .resolve(&username, Some(&claims.sub))
        .await?;

    Ok(success_to_api_response(profile))
}
