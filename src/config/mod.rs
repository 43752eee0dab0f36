use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub access_token_secret: String,
    pub access_token_expiration_secs: u64,
    pub refresh_token_secret: String,
    pub refresh_token_expiration_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        // 访问令牌有效期按小时配置（如 "1h"），刷新令牌按天配置（如 "10d"）
        let access_expiration = env::var("ACCESS_TOKEN_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(1);
        let refresh_expiration = env::var("REFRESH_TOKEN_EXPIRATION")?
            .trim_end_matches('d')
            .parse::<u64>()
            .unwrap_or(10);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(8000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api/v1".into()),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")?,
            access_token_expiration_secs: access_expiration * 3600,
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")?,
            refresh_token_expiration_secs: refresh_expiration * 24 * 3600,
        })
    }

    pub fn access_token_expiration(&self) -> Duration {
        Duration::from_secs(self.access_token_expiration_secs)
    }

    pub fn refresh_token_expiration(&self) -> Duration {
        Duration::from_secs(self.refresh_token_expiration_secs)
    }
}
