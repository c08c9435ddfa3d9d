//! Database connection settings and pool setup

use crate::connection::SeaOrmConnection;
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tablemap_query::{MapperConfig, MapperError, Result};
use tracing::{debug, info};

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sea-orm connection URL (`mysql://`, `sqlite:`, `postgres://`)
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Let sqlx log every statement on its own
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default)]
    pub mapper: MapperConfig,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            sqlx_logging: false,
            mapper: MapperConfig::default(),
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    /// Pool bounds actually used; SQLite is pinned to one session
    pub fn pool_bounds(&self) -> (u32, u32) {
        if self.is_sqlite() {
            (1, 1)
        } else {
            (self.min_connections, self.max_connections)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(MapperError::InvalidConfiguration(
                "database url is empty".to_string(),
            ));
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(MapperError::InvalidConfiguration(format!(
                "invalid pool bounds: min {} max {}",
                self.min_connections, self.max_connections
            )));
        }
        self.mapper.validate()
    }
}

pub async fn establish_connection(config: &DatabaseConfig) -> Result<Arc<SeaOrmConnection>> {
    config.validate()?;

    let (min, max) = config.pool_bounds();
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(max)
        .min_connections(min)
        .sqlx_logging(config.sqlx_logging);

    debug!("Opening database pool (min {}, max {})", min, max);
    let db = Database::connect(opt)
        .await
        .map_err(MapperError::execution)?;

    let connection = SeaOrmConnection::new(db);
    info!("Connected to {:?} database", connection.inner().get_database_backend());
    Ok(Arc::new(connection))
}
