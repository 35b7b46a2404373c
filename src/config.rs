use std::env;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Seconds between automatic overdue sweeps.
    pub overdue_sweep_secs: u64,
    /// Seconds a dashboard snapshot stays fresh before it is recomputed.
    pub dashboard_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://academa.db".to_string()),
            port: parse_or("PORT", 3000),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using development default");
                "academa-dev-secret".to_string()
            }),
            overdue_sweep_secs: parse_or("OVERDUE_SWEEP_SECS", 60),
            dashboard_ttl_secs: parse_or("DASHBOARD_TTL_SECS", 30),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {key} value {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
