use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub client: ClientConfig,
    pub cli: CliConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Status the API reserves for "access token expired".
    pub expired_status: u16,
    /// Let requests that hit the same expiry share one renewal call.
    pub coalesce_refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub config_dir: Option<PathBuf>,
    pub default_log_filter: String,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Point the client at a different API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.client.api_url = api_url.into();
        self
    }

    pub fn with_coalesced_refresh(mut self, enabled: bool) -> Self {
        self.client.coalesce_refresh = enabled;
        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SHOP_ADMIN_API_URL") {
            if !v.trim().is_empty() {
                self.client.api_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SHOP_ADMIN_TIMEOUT_SECS") {
            self.client.timeout_secs = v.parse().unwrap_or(self.client.timeout_secs);
        }
        if let Ok(v) = env::var("SHOP_ADMIN_EXPIRED_STATUS") {
            self.client.expired_status = v.parse().unwrap_or(self.client.expired_status);
        }
        if let Ok(v) = env::var("SHOP_ADMIN_COALESCE_REFRESH") {
            self.client.coalesce_refresh = v.parse().unwrap_or(self.client.coalesce_refresh);
        }
        if let Ok(v) = env::var("SHOP_ADMIN_CONFIG_DIR") {
            self.cli.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            client: ClientConfig {
                api_url: DEFAULT_API_URL.to_string(),
                timeout_secs: 30,
                expired_status: 403,
                coalesce_refresh: true,
            },
            cli: CliConfig {
                config_dir: None,
                default_log_filter: "shop_admin=debug".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            client: ClientConfig {
                api_url: DEFAULT_API_URL.to_string(),
                timeout_secs: 15,
                expired_status: 403,
                coalesce_refresh: true,
            },
            cli: CliConfig {
                config_dir: None,
                default_log_filter: "shop_admin=info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            client: ClientConfig {
                api_url: DEFAULT_API_URL.to_string(),
                timeout_secs: 10,
                expired_status: 403,
                coalesce_refresh: true,
            },
            cli: CliConfig {
                config_dir: None,
                default_log_filter: "shop_admin=warn".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
