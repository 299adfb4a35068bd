use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    /// Lifetime of a login token, seconds.
    pub token_ttl_secs: i64,
    /// Lifetime of a password-reset token, seconds.
    pub reset_ttl_secs: i64,
    /// Base URL used when building password-reset links.
    pub base_url: String,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let secret_key = env::var("SECRET_KEY")?;
        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(7200);
        let reset_ttl_secs = env::var("RESET_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(900);
        let base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}"));
        Ok(Self {
            database_url,
            host,
            port,
            secret_key,
            token_ttl_secs,
            reset_ttl_secs,
            base_url,
            mail: MailConfig::from_env(),
        })
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            server: env::var("MAIL_SERVER").ok(),
            port: env::var("MAIL_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(587),
            username: env::var("MAIL_USERNAME").ok(),
            password: env::var("MAIL_PASSWORD").ok(),
            sender: env::var("MAIL_DEFAULT_SENDER")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
        }
    }
}
