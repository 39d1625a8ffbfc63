//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::config::Config;
use crate::db::open_database;
use crate::notify::ConnectionRegistry;
use crate::storage::ObjectStore;

/// Shared context for all API routes. Each request opens its own SQLite
/// connection; the registry is the only cross-request state.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub soffice_bin: String,
    pub registry: Arc<ConnectionRegistry>,
    pub storage: Option<Arc<ObjectStore>>,
}

impl ApiContext {
    pub fn new(config: &Config) -> Self {
        Self {
            db_path: config.db_path.clone(),
            media_dir: config.media_dir(),
            soffice_bin: config.soffice_bin.clone(),
            registry: Arc::new(ConnectionRegistry::new()),
            storage: config
                .storage
                .clone()
                .map(|cfg| Arc::new(ObjectStore::new(cfg))),
        }
    }

    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.db_path).map_err(|e| ApiError::Internal(e.to_string()))
    }
}

/// Successful response carrying a payload.
#[derive(Serialize)]
pub struct DataBody<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Successful response carrying only a human-readable message.
#[derive(Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// SHA-256 hex of a password. Rows created before hashing was introduced
/// hold plaintext; the login handler upgrades them in place.
pub fn hash_password(password: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(password.as_bytes()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_password_is_stable_hex() {
        let h = hash_password("secret");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_password("secret"));
        assert_ne!(h, hash_password("Secret"));
    }

    #[test]
    fn test_context_opens_database() {
        let (ctx, _tmp) = test_support::test_context();
        let conn = ctx.open_db().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
