use anyhow::bail;

/// Upper bound for `TOKEN_TTL_MINUTES`: one year.
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_ttl_minutes: i64,
    /// Seconds between background purges of expired tokens; `None` leaves purging to login.
    pub purge_interval_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    /// Base URL the server-rendered pages use to reach the JSON API.
    pub api_base_url: String,
    /// Request body limit for recipe writes, which carry base64 images.
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("APP_PORT").unwrap_or(8080);
        let auth = AuthConfig {
            token_ttl_minutes: token_ttl(parse_var("TOKEN_TTL_MINUTES"))?,
            purge_interval_secs: parse_var("TOKEN_PURGE_INTERVAL_SECS"),
        };
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port));
        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(10),
            auth,
            api_base_url,
            max_body_bytes: parse_var("MAX_BODY_BYTES").unwrap_or(DEFAULT_MAX_BODY_BYTES),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Token lifetime in minutes; defaults to one hour.
fn token_ttl(raw: Option<i64>) -> anyhow::Result<i64> {
    match raw {
        None => Ok(60),
        Some(minutes) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) => Ok(minutes),
        Some(minutes) => bail!(
            "TOKEN_TTL_MINUTES must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_MINUTES,
            minutes
        ),
    }
}
