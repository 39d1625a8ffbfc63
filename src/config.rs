use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Fumigo";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Fumigo/ on all platforms (user-visible, per ops requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Fumigo")
}

/// Runtime configuration, resolved once at startup from environment
/// variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (`FUMIGO_PORT`, default 4000).
    pub bind_addr: SocketAddr,
    /// Root data directory (`FUMIGO_DATA_DIR`, default `~/Fumigo`).
    pub data_dir: PathBuf,
    /// SQLite database path (`FUMIGO_DB`, default `<data_dir>/fumigo.db`).
    pub db_path: PathBuf,
    /// Headless converter binary (`FUMIGO_SOFFICE_BIN`, default `soffice`).
    pub soffice_bin: String,
    /// Object-storage settings; `None` when `FUMIGO_STORAGE_ENDPOINT` is unset.
    pub storage: Option<StorageConfig>,
}

/// S3-compatible object-storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("FUMIGO_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);
        let data_dir = std::env::var("FUMIGO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir());
        let db_path = std::env::var("FUMIGO_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("fumigo.db"));
        let soffice_bin =
            std::env::var("FUMIGO_SOFFICE_BIN").unwrap_or_else(|_| "soffice".to_string());

        let storage = std::env::var("FUMIGO_STORAGE_ENDPOINT").ok().map(|endpoint| {
            StorageConfig {
                endpoint,
                region: std::env::var("FUMIGO_STORAGE_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                bucket: std::env::var("FUMIGO_STORAGE_BUCKET")
                    .unwrap_or_else(|_| "fumigo".to_string()),
                access_key: std::env::var("FUMIGO_STORAGE_ACCESS_KEY").unwrap_or_default(),
                secret_key: std::env::var("FUMIGO_STORAGE_SECRET_KEY").unwrap_or_default(),
            }
        });

        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            data_dir,
            db_path,
            soffice_bin,
            storage,
        }
    }

    /// Directory uploaded media is written to and served from (`/media`).
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Fumigo"));
    }

    #[test]
    fn media_dir_under_data_dir() {
        let cfg = Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
            data_dir: PathBuf::from("/tmp/fumigo-test"),
            db_path: PathBuf::from("/tmp/fumigo-test/fumigo.db"),
            soffice_bin: "soffice".into(),
            storage: None,
        };
        assert!(cfg.media_dir().starts_with(&cfg.data_dir));
        assert!(cfg.media_dir().ends_with("media"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
