use mongodb::{options::ClientOptions, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::memory::InMemoryClassRepository;
use super::migration::ensure_collections_and_indexes;
use super::mongo::MongoClassRepository;
use super::repository::ClassRepository;
use crate::config::{ConfigError, DatabaseConfig, StorageBackend};

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid connection options: {0}")]
    InvalidOptions(String),
}

/// Builds the class store selected by configuration.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the configured backend. The Mongo client connects lazily, so an
    /// unreachable server does not fail startup; it shows up in health and as
    /// 503s instead. Migration failures are logged and startup continues.
    pub async fn connect(
        config: &DatabaseConfig,
        run_migrations: bool,
    ) -> Result<Arc<dyn ClassRepository>, DatabaseError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory class store");
                Ok(Arc::new(InMemoryClassRepository::new()))
            }
            StorageBackend::Mongo => {
                let repository = Self::connect_mongo(config).await?;

                if run_migrations {
                    if let Err(e) = ensure_collections_and_indexes(repository.database()).await {
                        warn!("Migrations failed, continuing without them: {}", e);
                    }
                } else {
                    info!("Skipping migrations");
                }

                Ok(Arc::new(repository))
            }
        }
    }

    async fn connect_mongo(config: &DatabaseConfig) -> Result<MongoClassRepository, DatabaseError> {
        let uri = config.connection_uri()?;

        let mut options = ClientOptions::parse(&uri)
            .await
            .map_err(|e| DatabaseError::InvalidOptions(e.to_string()))?;
        options.app_name = Some("classe-microservice".to_string());
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_secs));

        let client =
            Client::with_options(options).map_err(|e| DatabaseError::InvalidOptions(e.to_string()))?;

        info!(
            "Created MongoDB client for database {} (collection {})",
            config.database, config.collection
        );
        Ok(MongoClassRepository::new(&client, &config.database, &config.collection))
    }
}
