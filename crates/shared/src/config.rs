//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Settlement configuration.
    #[serde(default)]
    pub settlement: SettlementConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Settlement configuration.
///
/// The draft marker is configuration rather than an inline literal so the
/// convention can be swapped without touching the settlement code.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Prefix on a settlement note that marks the settlement as a draft.
    #[serde(default = "default_draft_prefix")]
    pub draft_note_prefix: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            draft_note_prefix: default_draft_prefix(),
        }
    }
}

fn default_draft_prefix() -> String {
    "[draft] ".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HEARTHBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
