use std::io;

use thiserror::Error;

/// Keys of the persisted client settings.
pub mod keys {
    pub const LANGUAGE: &str = "language";
    pub const MAP_TOKEN: &str = "map-token";
    pub const AUTH_SESSION: &str = "auth-session";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Durable key-value storage on the client.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
