//! Configuration loading and validation

use anyhow::{Context, Result, bail};
use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File, FileFormat};
use mohali_auth::{GatekeeperPolicy, RouteClass};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Prefix for environment overrides, e.g. `MOHALI__SERVER__PORT=8080`
const ENV_PREFIX: &str = "MOHALI";

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 24 * 365 * 10;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub gatekeeper: GatekeeperConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// SQLite connection URL, creating the file if needed
    pub fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing secret; `JWT_SECRET` takes precedence
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
    /// First administrator, created only while the user table is empty
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_expiry_hours: default_token_expiry_hours(),
            admin_email: None,
            admin_password: None,
        }
    }
}

/// Route protection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    #[serde(default = "default_protected_api_prefixes")]
    pub protected_api_prefixes: Vec<String>,
    #[serde(default = "default_protected_page_prefixes")]
    pub protected_page_prefixes: Vec<String>,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        let policy = GatekeeperPolicy::default();
        Self {
            protected_api_prefixes: policy.protected_api_prefixes,
            protected_page_prefixes: policy.protected_page_prefixes,
            cookie_name: policy.cookie_name,
            login_path: policy.login_path,
        }
    }
}

impl From<&GatekeeperConfig> for GatekeeperPolicy {
    fn from(config: &GatekeeperConfig) -> Self {
        Self {
            protected_api_prefixes: config.protected_api_prefixes.clone(),
            protected_page_prefixes: config.protected_page_prefixes.clone(),
            cookie_name: config.cookie_name.clone(),
            login_path: config.login_path.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "./data/mohali-mart.db".to_string()
}

fn default_token_expiry_hours() -> i64 {
    168
}

fn default_protected_api_prefixes() -> Vec<String> {
    GatekeeperPolicy::default().protected_api_prefixes
}

fn default_protected_page_prefixes() -> Vec<String> {
    GatekeeperPolicy::default().protected_page_prefixes
}

fn default_cookie_name() -> String {
    GatekeeperPolicy::default().cookie_name
}

fn default_login_path() -> String {
    GatekeeperPolicy::default().login_path
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from an optional TOML file plus `MOHALI__*` variables
    pub fn load(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            info!("Config file not found at {}, using defaults", path);
        }

        let builder = ::config::Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("gatekeeper.protected_api_prefixes")
                    .with_list_parse_key("gatekeeper.protected_page_prefixes"),
            );

        Self::build(builder).with_context(|| format!("Failed to load configuration from {}", path))
    }

    /// Parse configuration from TOML text
    #[cfg(test)]
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::build(::config::Config::builder().add_source(File::from_str(content, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&self.auth.token_expiry_hours) {
            bail!(
                "auth.token_expiry_hours must be between 1 and {}",
                MAX_TOKEN_EXPIRY_HOURS
            );
        }

        let gk = &self.gatekeeper;
        for prefix in gk.protected_api_prefixes.iter().chain(&gk.protected_page_prefixes) {
            if !prefix.starts_with('/') {
                bail!("protected prefix '{}' must start with '/'", prefix);
            }
        }
        if !gk.login_path.starts_with('/') {
            bail!("gatekeeper.login_path must start with '/'");
        }
        if gk.cookie_name.is_empty() {
            bail!("gatekeeper.cookie_name must not be empty");
        }
        // The login page can never be reached otherwise
        if GatekeeperPolicy::from(gk).classify(&gk.login_path) != RouteClass::Open {
            bail!("gatekeeper.login_path '{}' is itself protected", gk.login_path);
        }

        match self.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => bail!("unknown logging.format '{}'", other),
        }

        Ok(())
    }

    /// Resolve the signing secret, preferring the explicit value
    pub fn jwt_secret(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.auth.jwt_secret.clone())
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET is not set; refusing to start without a signing secret")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.token_expiry_hours, 168);
        assert_eq!(config.gatekeeper.protected_api_prefixes, vec!["/api/contact"]);
        assert_eq!(
            config.gatekeeper.protected_page_prefixes,
            vec!["/tattoo/booking", "/art/booking"]
        );
        assert_eq!(config.gatekeeper.cookie_name, "token");
        assert_eq!(config.gatekeeper.login_path, "/auth");
        assert!(config.metrics.enabled);
        assert_eq!(config.database.url(), "sqlite:./data/mohali-mart.db?mode=rwc");
    }

    #[test]
    fn test_file_values_override_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8088

            [gatekeeper]
            protected_page_prefixes = ["/orders"]
            login_path = "/login"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.gatekeeper.protected_page_prefixes, vec!["/orders"]);
        assert_eq!(config.gatekeeper.protected_api_prefixes, vec!["/api/contact"]);
        assert_eq!(config.gatekeeper.login_path, "/login");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_reads_file_and_tolerates_missing_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[database]\npath = \"/tmp/shop.db\"").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.path, "/tmp/shop.db");

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let config = Config::load(missing.to_str().unwrap()).unwrap();
        assert_eq!(config.database.path, default_db_path());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        for content in [
            "[auth]\ntoken_expiry_hours = 0",
            "[gatekeeper]\nprotected_api_prefixes = [\"api\"]",
            "[gatekeeper]\nlogin_path = \"auth\"",
            "[gatekeeper]\nlogin_path = \"/art/booking/login\"",
            "[gatekeeper]\ncookie_name = \"\"",
            "[logging]\nformat = \"xml\"",
        ] {
            assert!(Config::from_toml(content).is_err(), "{content}");
        }
    }

    #[test]
    fn test_token_expiry_is_bounded() {
        let at_limit = format!("[auth]\ntoken_expiry_hours = {}", MAX_TOKEN_EXPIRY_HOURS);
        assert!(Config::from_toml(&at_limit).is_ok());

        for hours in [
            MAX_TOKEN_EXPIRY_HOURS + 1,
            10_000_000_000,
            3_000_000_000_000,
            -1,
        ] {
            let content = format!("[auth]\ntoken_expiry_hours = {}", hours);
            assert!(Config::from_toml(&content).is_err(), "{hours}");
        }
    }

    #[test]
    fn test_jwt_secret_resolution() {
        let mut config = Config::from_toml("").unwrap();
        assert!(config.jwt_secret(None).is_err());
        assert!(config.jwt_secret(Some("  ".to_string())).is_err());

        config.auth.jwt_secret = Some("from-file".to_string());
        assert_eq!(config.jwt_secret(None).unwrap(), "from-file");
        assert_eq!(config.jwt_secret(Some("from-env".to_string())).unwrap(), "from-env");
    }
}
