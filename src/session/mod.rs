use std::sync::Arc;

use crate::error::AppError;
use crate::store::user::{User, UserStore};
use crate::token::{TokenKind, TokenService};

/// 注册所需字段，头像与封面为外部媒体服务提供的URL
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub password: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// 会话生命周期：注册、登录、刷新、登出、改密。
/// 自身不持有任何状态，所有状态都在用户存储中。
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl SessionManager {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, input: Registration) -> Result<User, AppError> {
        let required = [
            &input.username,
            &input.email,
            &input.fullname,
            &input.password,
            &input.avatar_url,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::MissingCredentials);
        }

        let mut user = User::new(
            &input.username,
            &input.email,
            &input.fullname,
            &input.avatar_url,
            input.cover_image_url,
        );
        user.set_password(&input.password)?;

        if self
            .users
            .find_by_username_or_email(Some(&user.username), Some(&user.email))
            .await?
            .is_some()
        {
            return Err(AppError::UserAlreadyExists);
        }

        // 并发注册同名用户时由存储层唯一约束兜底
        self.users.create(&user).await
    }

    pub async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        let username = normalize(username);
        let email = normalize(email);
        if username.is_none() && email.is_none() {
            return Err(AppError::MissingCredentials);
        }

        let mut user = self
            .users
            .find_by_username_or_email(username.as_deref(), email.as_deref())
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.verify_password(password)? {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access(&user)?;
        let refresh_token = self.tokens.issue_refresh(&user)?;

        // 覆盖旧值：每个账号只保留一个有效会话，
        // 重复登录会使先前会话的刷新令牌失效
        self.users
            .update_refresh_token(&user.id, Some(&refresh_token))
            .await?;

        user.refresh_token = None;
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    pub async fn refresh(&self, presented: Option<&str>) -> Result<AuthTokens, AppError> {
        let presented = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::MissingToken)?;

        let claims = self.tokens.verify(presented, TokenKind::Refresh)?;

        // 查不到用户按令牌被篡改或已失效处理
        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        // 必须与存储的当前刷新令牌完全一致：一旦轮换或登出，
        // 旧令牌即便签名仍有效也永久拒绝
        match user.refresh_token.as_deref() {
            Some(stored) if stored == presented => {}
            _ => return Err(AppError::RefreshTokenExpiredOrUsed),
        }

        let access_token = self.tokens.issue_access(&user)?;
        let refresh_token = self.tokens.issue_refresh(&user)?;

        // 读取-比较-写入并非原子：同一账号两个并发刷新可能都通过比较，
        // 存储层只提供单行写，此弱化已知且接受
        self.users
            .update_refresh_token(&user.id, Some(&refresh_token))
            .await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
        })
    }

    /// 登出即清除存储的刷新令牌，重复登出不报错
    pub async fn logout(&self, user_id: &str) -> Result<(), AppError> {
        self.users.update_refresh_token(user_id, None).await
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.verify_password(old_password)? {
            return Err(AppError::InvalidCredentials);
        }

        user.set_password(new_password)?;
        self.users.save(&user).await?;
        Ok(())
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn test_tokens() -> TokenService {
        let config = crate::config::Config {
            database_url: String::new(),
            server_host: "127.0.0.1".into(),
            server_port: 0,
            api_base_uri: "/api/v1".into(),
            access_token_secret: "access-secret-for-tests".into(),
            access_token_expiration_secs: 3600,
            refresh_token_secret: "refresh-secret-for-tests".into(),
            refresh_token_expiration_secs: 10 * 24 * 3600,
        };
        TokenService::new(&config)
    }

    fn manager() -> (Arc<MemoryStore>, SessionManager) {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionManager::new(store.clone(), test_tokens());
        (store, sessions)
    }

    fn ada() -> Registration {
        Registration {
            username: "ada".into(),
            email: "ada@x.io".into(),
            fullname: "Ada Lovelace".into(),
            password: "secret123".into(),
            avatar_url: "http://cdn/ada.png".into(),
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn login_returns_tokens_and_sanitized_user() {
        let (store, sessions) = manager();
        sessions.register(ada()).await.unwrap();

        let outcome = sessions
            .login(Some("ada"), None, "secret123")
            .await
            .unwrap();
        assert!(!outcome.access_token.is_empty());
        assert!(!outcome.refresh_token.is_empty());

        // 序列化后不包含密码与刷新令牌字段
        let json = serde_json::to_value(&outcome.user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());

        // 刷新令牌已持久化
        assert_eq!(
            store.stored_refresh_token(&outcome.user.id).as_deref(),
            Some(outcome.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn login_accepts_email_and_mixed_case_identifier() {
        let (_store, sessions) = manager();
        sessions.register(ada()).await.unwrap();

        assert!(sessions.login(None, Some("Ada@X.io"), "secret123").await.is_ok());
        assert!(sessions.login(Some("ADA"), None, "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn login_failures_map_to_declared_kinds() {
        let (_store, sessions) = manager();
        sessions.register(ada()).await.unwrap();

        assert_eq!(
            sessions.login(None, None, "secret123").await.unwrap_err(),
            AppError::MissingCredentials
        );
        assert_eq!(
            sessions.login(Some("ghost"), None, "secret123").await.unwrap_err(),
            AppError::UserNotFound
        );
        assert_eq!(
            sessions.login(Some("ada"), None, "wrong").await.unwrap_err(),
            AppError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_blank_fields() {
        let (_store, sessions) = manager();
        sessions.register(ada()).await.unwrap();

        assert_eq!(
            sessions.register(ada()).await.unwrap_err(),
            AppError::UserAlreadyExists
        );

        let mut blank = ada();
        blank.username = "grace".into();
        blank.email = "grace@x.io".into();
        blank.password = "  ".into();
        assert_eq!(
            sessions.register(blank).await.unwrap_err(),
            AppError::MissingCredentials
        );
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_superseded_token() {
        let (_store, sessions) = manager();
        sessions.register(ada()).await.unwrap();
        let outcome = sessions.login(Some("ada"), None, "secret123").await.unwrap();

        let rotated = sessions
            .refresh(Some(&outcome.refresh_token))
            .await
            .unwrap();
        assert_ne!(rotated.refresh_token, outcome.refresh_token);
        assert!(!rotated.access_token.is_empty());

        // 被轮换掉的旧令牌在有效期内也被永久拒绝
        assert_eq!(
            sessions
                .refresh(Some(&outcome.refresh_token))
                .await
                .unwrap_err(),
            AppError::RefreshTokenExpiredOrUsed
        );

        // 新令牌仍然可用
        assert!(sessions.refresh(Some(&rotated.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_failures_map_to_declared_kinds() {
        let (_store, sessions) = manager();
        sessions.register(ada()).await.unwrap();

        assert_eq!(
            sessions.refresh(None).await.unwrap_err(),
            AppError::MissingToken
        );
        assert_eq!(
            sessions.refresh(Some("   ")).await.unwrap_err(),
            AppError::MissingToken
        );
        assert_eq!(
            sessions.refresh(Some("not-a-token")).await.unwrap_err(),
            AppError::InvalidToken
        );

        // 访问令牌不能用于刷新
        let outcome = sessions.login(Some("ada"), None, "secret123").await.unwrap();
        assert_eq!(
            sessions.refresh(Some(&outcome.access_token)).await.unwrap_err(),
            AppError::InvalidToken
        );
    }

    #[tokio::test]
    async fn logout_invalidates_refresh_token_and_is_idempotent() {
        let (store, sessions) = manager();
        sessions.register(ada()).await.unwrap();
        let outcome = sessions.login(Some("ada"), None, "secret123").await.unwrap();

        sessions.logout(&outcome.user.id).await.unwrap();
        assert_eq!(store.stored_refresh_token(&outcome.user.id), None);

        assert_eq!(
            sessions
                .refresh(Some(&outcome.refresh_token))
                .await
                .unwrap_err(),
            AppError::RefreshTokenExpiredOrUsed
        );

        // 重复登出不报错
        sessions.logout(&outcome.user.id).await.unwrap();
    }

    #[tokio::test]
    async fn second_login_invalidates_first_sessions_refresh_token() {
        let (_store, sessions) = manager();
        sessions.register(ada()).await.unwrap();

        let first = sessions.login(Some("ada"), None, "secret123").await.unwrap();
        let second = sessions.login(Some("ada"), None, "secret123").await.unwrap();

        assert_eq!(
            sessions.refresh(Some(&first.refresh_token)).await.unwrap_err(),
            AppError::RefreshTokenExpiredOrUsed
        );
        assert!(sessions.refresh(Some(&second.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let (_store, sessions) = manager();
        let user = sessions.register(ada()).await.unwrap();

        assert_eq!(
            sessions
                .change_password(&user.id, "wrong", "next-secret")
                .await
                .unwrap_err(),
            AppError::InvalidCredentials
        );

        sessions
            .change_password(&user.id, "secret123", "next-secret")
            .await
            .unwrap();

        assert_eq!(
            sessions.login(Some("ada"), None, "secret123").await.unwrap_err(),
            AppError::InvalidCredentials
        );
        assert!(sessions.login(Some("ada"), None, "next-secret").await.is_ok());
    }
}
