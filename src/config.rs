//! Client configuration

use crate::error::{ClientError, Result};
use crate::storage::{LocalStorage, SessionStorage, StorageArea};
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "STOREFRONT_API_URL";
/// Environment variable selecting file-backed storage
pub const ENV_STORAGE_PATH: &str = "STOREFRONT_STORAGE_PATH";

/// Where the client keeps its tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// In memory; tokens are gone when the client is dropped
    Session,
    /// JSON file at the given path; tokens survive restarts
    Local(PathBuf),
}

/// Configuration for the storefront client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin every relative request path is resolved against
    pub base_url: String,

    /// Storage area for the `token`, `access` and `refresh` keys
    pub persistence: Persistence,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            persistence: Persistence::Session,
        }
    }

    /// Read the configuration from `STOREFRONT_API_URL` and
    /// `STOREFRONT_STORAGE_PATH`, falling back to the defaults
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let persistence = match std::env::var(ENV_STORAGE_PATH) {
            Ok(path) if !path.is_empty() => Persistence::Local(PathBuf::from(path)),
            _ => Persistence::Session,
        };

        Self {
            base_url,
            persistence,
        }
    }

    pub fn with_persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = persistence;
        self
    }

    /// Parse and check the base URL
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::Configuration(format!("Invalid base URL {:?}: {e}", self.base_url))
        })?;

        if url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "Base URL {:?} cannot have paths joined to it",
                self.base_url
            )));
        }

        Ok(url)
    }

    /// Open the configured storage area
    pub fn open_storage(&self) -> Result<Arc<dyn StorageArea>> {
        let storage: Arc<dyn StorageArea> = match &self.persistence {
            Persistence::Session => Arc::new(SessionStorage::new()),
            Persistence::Local(path) => Arc::new(LocalStorage::open(path.clone())?),
        };
        Ok(storage)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
