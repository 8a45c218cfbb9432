use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Empty means any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL used for `Location` headers, e.g. `https://fragments.example.com`.
    /// Falls back to the request's `Host` header when unset.
    pub api_url: Option<String>,
    pub max_body_size: usize,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Filesystem,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Root directory for the filesystem backend.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Basic,
    Jwt,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// File of `email:<argon2 hash>` lines, read in basic mode.
    pub htpasswd: Option<PathBuf>,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_body_size", 5 * 1024 * 1024)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.backend", "memory")?
            .set_default("storage.path", "./data/fragments")?
            .set_default("auth.mode", "basic")?
            .set_default("auth.htpasswd", "./config/.htpasswd")?
            .set_default("log.level", "info")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FRAGMENTS__SERVER__PORT)
            .add_source(
                Environment::with_prefix("FRAGMENTS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
