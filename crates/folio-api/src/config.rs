use std::env;
use std::path::PathBuf;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub cors_origins: Vec<String>,
    pub blob_dir: PathBuf,
    /// Base URL used when building attachment links
    pub public_url: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = parse_var("PORT").unwrap_or(3000);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/folio".to_string());

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS").unwrap_or(10);
        let db_acquire_timeout_secs = parse_var("DB_ACQUIRE_TIMEOUT_SECS").unwrap_or(10);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let blob_dir = env::var("BLOB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/blobs"));

        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        // Base64 inflates uploads by a third, leave room for that
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES").unwrap_or(15 * 1024 * 1024);

        Self {
            port,
            database_url,
            db_max_connections,
            db_acquire_timeout_secs,
            cors_origins,
            blob_dir,
            public_url,
            max_upload_bytes,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
