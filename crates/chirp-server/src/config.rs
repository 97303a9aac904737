use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chirp_store::{InMemoryRecordStore, RecordStore, SqliteRecordStore};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            storage: StorageConfig::default(),
        }
    }
}

/// Where the record store keeps its state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Sqlite { path: PathBuf },
}

impl ServerConfig {
    /// Parse a config from TOML text; absent fields take their defaults.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Render the config as TOML, in the shape `from_toml_str` accepts.
    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Open the configured backend.
    pub fn open_store(&self) -> ServerResult<Arc<dyn RecordStore>> {
        let store: Arc<dyn RecordStore> = match &self.storage {
            StorageConfig::Memory => {
                tracing::info!("using in-memory record store");
                Arc::new(InMemoryRecordStore::new())
            }
            StorageConfig::Sqlite { path } => Arc::new(SqliteRecordStore::open(path)?),
        };
        Ok(store)
    }
}
