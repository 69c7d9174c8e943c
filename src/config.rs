use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_days: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    /// When false, Google sign-in is refused for accounts that already
    /// carry a local password hash.
    pub auto_link: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub google: GoogleConfig,
    /// External link served behind the guarded /secrets route.
    pub secret_link: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let secret = match std::env::var("SESSION_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("SESSION_SECRET not set; falling back to a development secret");
                "insecure-dev-session-secret".into()
            }
        };
        let session = SessionConfig {
            secret,
            ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true")
                .unwrap_or(false),
        };
        let google = GoogleConfig {
            client_id: std::env::var("GOOGLE_CLIENT_ID")?,
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET")?,
            callback_url: std::env::var("GOOGLE_CALLBACK_URL")?,
            auto_link: std::env::var("GOOGLE_AUTO_LINK")
                .map(|v| v != "false")
                .unwrap_or(true),
        };
        let secret_link = std::env::var("SECRET_LINK")?;
        Ok(Self {
            database_url,
            session,
            google,
            secret_link,
        })
    }
}
