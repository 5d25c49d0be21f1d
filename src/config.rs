use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

use crate::models::Partner;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_PO_STATUS: &str = "Open";
const DEFAULT_RECONCILE_TOLERANCE: f64 = 0.01;

/// Import-pipeline policy knobs. Business rules that used to live in global
/// state (fixed partner-to-distributor routing, status defaults) are config
/// here and injected into the assembler and importer.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Absolute tolerance when reconciling recomputed totals against
    /// partner-declared totals.
    #[serde(default = "default_reconcile_tolerance")]
    pub reconcile_tolerance: f64,

    /// Status stamped on newly imported purchase orders.
    #[serde(default = "default_po_status")]
    pub default_status: String,

    /// Partner key -> distributor routed into the unified ledger.
    #[serde(default)]
    pub distributors: HashMap<String, String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            reconcile_tolerance: DEFAULT_RECONCILE_TOLERANCE,
            default_status: DEFAULT_PO_STATUS.to_string(),
            distributors: HashMap::new(),
        }
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "database_url must not be empty"))]
    pub database_url: String,

    /// Application environment
    #[serde(default = "default_env")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Import-pipeline policy
    #[serde(default)]
    pub import: ImportConfig,
}

impl AppConfig {
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            import: ImportConfig::default(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Materializes the validated import policy consumed by the assembler
    /// and importer.
    pub fn import_policy(&self) -> ImportPolicy {
        let tolerance = Decimal::try_from(self.import.reconcile_tolerance)
            .unwrap_or_else(|_| Decimal::new(1, 2));
        let mut distributors = HashMap::new();
        for (key, value) in &self.import.distributors {
            match Partner::from_str(key) {
                Ok(partner) => {
                    distributors.insert(partner, value.clone());
                }
                Err(_) => {
                    warn!(partner = %key, "ignoring distributor route for unknown partner");
                }
            }
        }
        ImportPolicy {
            reconcile_tolerance: tolerance,
            default_status: self.import.default_status.clone(),
            distributors,
        }
    }
}

/// Injected policy object consumed by the assembler and importer.
#[derive(Clone, Debug)]
pub struct ImportPolicy {
    pub reconcile_tolerance: Decimal,
    pub default_status: String,
    pub distributors: HashMap<Partner, String>,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            reconcile_tolerance: Decimal::new(1, 2),
            default_status: DEFAULT_PO_STATUS.to_string(),
            distributors: HashMap::new(),
        }
    }
}

impl ImportPolicy {
    pub fn distributor_for(&self, partner: Partner) -> Option<&str> {
        self.distributors.get(&partner).map(String::as_str)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Loads configuration from layered sources: built-in defaults, a
/// `config/<env>` file when present, then `APP__*` environment overrides.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    let mut builder = Config::builder()
        .set_default("environment", run_env.clone())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("database_url", "sqlite://vendorhub.db?mode=rwc")?;

    if Path::new(CONFIG_DIR).exists() {
        builder = builder
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));
    } else {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let cfg: AppConfig = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    cfg.validate()?;
    Ok(cfg)
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("vendorhub_api={},sea_orm=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_po_status() -> String {
    DEFAULT_PO_STATUS.to_string()
}

fn default_reconcile_tolerance() -> f64 {
    DEFAULT_RECONCILE_TOLERANCE
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout_secs() -> u64 {
    30
}

fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_db_acquire_timeout_secs() -> u64 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn import_policy_routes_known_partners_only() {
        let mut cfg = AppConfig::new("sqlite::memory:".into(), "test".into());
        cfg.import
            .distributors
            .insert("swiftmart".into(), "North Foods Distribution".into());
        cfg.import
            .distributors
            .insert("not-a-partner".into(), "ignored".into());

        let policy = cfg.import_policy();
        assert_eq!(
            policy.distributor_for(Partner::Swiftmart),
            Some("North Foods Distribution")
        );
        assert_eq!(policy.distributor_for(Partner::Freshkart), None);
        assert_eq!(policy.reconcile_tolerance, dec!(0.01));
    }
}
