use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

/// 业务错误类型，统一映射为HTTP状态码与错误码
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    MissingCredentials,
    UserNotFound,
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    ExpiredToken,
    RefreshTokenExpiredOrUsed,
    UserAlreadyExists,
    MissingUsername,
    ChannelNotFound,
    StoreUnavailable,
    Misconfiguration,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredentials | AppError::MissingUsername => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::RefreshTokenExpiredOrUsed => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::ChannelNotFound => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::StoreUnavailable | AppError::Misconfiguration => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> i32 {
        match self {
            AppError::MissingCredentials | AppError::MissingUsername => {
                error_codes::VALIDATION_ERROR
            }
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::RefreshTokenExpiredOrUsed => error_codes::AUTH_FAILED,
            AppError::UserNotFound | AppError::ChannelNotFound => error_codes::NOT_FOUND,
            AppError::UserAlreadyExists => error_codes::USER_EXISTS,
            AppError::StoreUnavailable | AppError::Misconfiguration => error_codes::INTERNAL_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::MissingCredentials => "必填字段缺失",
            AppError::UserNotFound => "用户不存在",
            AppError::InvalidCredentials => "用户凭证无效",
            AppError::MissingToken => "未提供令牌",
            AppError::InvalidToken => "令牌无效",
            AppError::ExpiredToken => "令牌已过期",
            AppError::RefreshTokenExpiredOrUsed => "刷新令牌已过期或已使用",
            AppError::UserAlreadyExists => "用户名或邮箱已存在",
            AppError::MissingUsername => "用户名不能为空",
            AppError::ChannelNotFound => "频道不存在",
            AppError::StoreUnavailable => "数据库错误",
            AppError::Misconfiguration => "服务配置错误",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = error_to_api_response::<()>(self.code(), self.message().to_string());
        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::UserAlreadyExists;
            }
        }
        tracing::error!("database error: {:?}", e);
        AppError::StoreUnavailable
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        tracing::error!("bcrypt error: {:?}", e);
        AppError::Misconfiguration
    }
}
