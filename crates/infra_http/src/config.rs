//! Client configuration

use domain_invoice::RemovePolicy;
use serde::Deserialize;

/// Settings for the HTTP adapters and the CLI
///
/// Every field has a default so a partial environment is enough.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the invoice and membership services
    pub api_base_url: String,
    /// Base URL of the identity provider
    pub auth_base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// What removing the last required list entry does
    pub remove_policy: RemovePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            auth_base_url: "http://localhost:8080/auth".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_secs: 10,
            log_level: "info".to_string(),
            remove_policy: RemovePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `INVOICE_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("INVOICE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Reads a `.env` file if present, then the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_secs.saturating_mul(1000)
    }

    /// Joins `path` onto the API base URL
    pub fn api_url(&self, path: &str) -> String {
        join(&self.api_base_url, path)
    }

    /// Joins `path` onto the auth base URL
    pub fn auth_url(&self, path: &str) -> String {
        join(&self.auth_base_url, path)
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
