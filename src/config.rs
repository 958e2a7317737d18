use time::Duration;

/// Token and session settings, loaded from the environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub max_refresh_sessions: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
    pub auth: AuthConfig,
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let auth = AuthConfig {
            secret_key: std::env::var("SECRET_KEY")?,
            algorithm: std::env::var("ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            access_token_ttl: Duration::minutes(env_i64("ACCESS_TOKEN_EX_MINUTES", 30)),
            refresh_token_ttl: Duration::days(env_i64("REFRESH_TOKEN_EX_DAYS", 30)),
            max_refresh_sessions: env_i64("MAX_REFRESH_SESSIONS_COUNT", 5),
        };
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")?,
            pool_size: env_i64("DB_POOL_SIZE", 10) as u32,
            acquire_timeout_secs: env_i64("DB_ACQUIRE_TIMEOUT_SECS", 60) as u64,
            auth,
        })
    }
}
