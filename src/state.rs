use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;

use crate::auth::{jwt::JwtKeys, repo::PgUserStore, services::CredentialService};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    /// Connect to Postgres and build the credential service from `config`.
    pub async fn init(config: &AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let keys = match config.jwt.secret.as_deref() {
            Some(secret) => Some(JwtKeys::from_secret(secret)),
            None => {
                warn!("JWT_SECRET is not set; login will fail until it is configured");
                None
            }
        };

        let store = Arc::new(PgUserStore::new(db.clone()));
        let credentials = Arc::new(CredentialService::new(store, keys));
        Ok((Self { credentials }, db))
    }

    pub fn from_parts(credentials: Arc<CredentialService>) -> Self {
        Self { credentials }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::auth::repo::memory::MemoryUserStore;

        let store = Arc::new(MemoryUserStore::default());
        let keys = JwtKeys::from_secret("test-secret");
        Self::from_parts(Arc::new(CredentialService::new(store, Some(keys))))
    }
}
