use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::dashboard::SnapshotCache;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_encoding_key: EncodingKey,
    pub jwt_decoding_key: DecodingKey,
    pub dashboard_cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            db,
            jwt_encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            jwt_decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            dashboard_cache: Arc::new(SnapshotCache::new(Duration::from_secs(
                config.dashboard_ttl_secs,
            ))),
        }
    }
}
