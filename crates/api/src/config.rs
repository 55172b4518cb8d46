use std::env;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub user_secret: String,
    pub admin_secret: String,
    pub session_ttl: chrono::Duration,
    pub redis_url: Option<String>,
    pub database_url: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_or("LATCHKEY_BIND", "0.0.0.0:8080"),
            user_secret: secret_or_dev_default("LATCHKEY_SECRET_USER", "latchkey-user-dev-secret"),
            admin_secret: secret_or_dev_default(
                "LATCHKEY_SECRET_ADMIN",
                "latchkey-admin-dev-secret",
            ),
            session_ttl: chrono::Duration::hours(session_ttl_hours()),
            redis_url: env::var("REDIS_URL").ok(),
            database_url: env::var("DATABASE_URL").ok(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn secret_or_dev_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{name} not set; using insecure dev default");
        default.to_string()
    })
}

fn session_ttl_hours() -> i64 {
    env::var("LATCHKEY_SESSION_TTL_HOURS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(24)
}
