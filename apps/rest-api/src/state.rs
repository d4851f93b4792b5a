//! Shared application state.

use axum::extract::FromRef;

use pressline_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::processor::ProcessorClient;

/// State shared by every route handler. Cheap to clone: the database
/// wraps a pooled connection set and the processor client a reqwest
/// client.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub processor: ProcessorClient,
    pub config: ApiConfig,
}

impl AppState {
    /// Assembles state from loaded configuration and a ready database.
    pub fn new(config: ApiConfig, db: Database) -> Self {
        let jwt = JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );
        let processor = ProcessorClient::new(
            config.processor_base_url.clone(),
            config.processor_secret_key.clone(),
        );

        AppState {
            db,
            jwt,
            processor,
            config,
        }
    }
}
