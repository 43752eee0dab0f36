use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::store::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // 用户ID
    pub username: String, // 非权威字段，仅用于展示
    pub kind: TokenKind,
    pub exp: i64, // 过期时间
    pub iat: i64, // 签发时间
    pub jti: String,
}

/// 令牌签发与校验，密钥和有效期在构造时注入
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    access_expiration_secs: u64,
    refresh_secret: String,
    refresh_expiration_secs: u64,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self {
            access_secret: config.access_token_secret.clone(),
            access_expiration_secs: config.access_token_expiration_secs,
            refresh_secret: config.refresh_token_secret.clone(),
            refresh_expiration_secs: config.refresh_token_expiration_secs,
        }
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access_secret.as_bytes(),
            TokenKind::Refresh => self.refresh_secret.as_bytes(),
        }
    }

    fn expiration_secs(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_expiration_secs as i64,
            TokenKind::Refresh => self.refresh_expiration_secs as i64,
        }
    }

    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, TokenKind::Access)
    }

    pub fn issue_refresh(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, TokenKind::Refresh)
    }

    fn issue(&self, user: &User, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            kind,
            exp: now + self.expiration_secs(kind),
            iat: now,
            // jti保证同一秒内签发的令牌互不相同
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
        .map_err(|e| {
            tracing::error!("failed to sign {:?} token: {}", kind, e);
            AppError::Misconfiguration
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret(kind)),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                tracing::debug!("{:?} token expired", kind);
                AppError::ExpiredToken
            }
            other => {
                tracing::debug!("{:?} token rejected: {:?}", kind, other);
                AppError::InvalidToken
            }
        })?;

        if data.claims.kind != kind {
            return Err(AppError::InvalidToken);
        }

        Ok(data.claims)
    }
}
