//! Service configuration
//!
//! Loaded from an optional `config/surfsup.{toml,yaml,json}` file and then
//! `SURFSUP__`-prefixed environment variables, e.g.
//! `SURFSUP__DATABASE__DATABASE_URL=sqlite://data/hawaii.sqlite`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use storage::{ObservationDate, StoreConfig};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "SURFSUP_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/surfsup";

/// Last date of the bundled dataset
pub const DEFAULT_REFERENCE_DATE: &str = "2017-08-23";

/// Station served by `/api/v1.0/tobs` in fixed mode
pub const DEFAULT_STATION_ID: &str = "USC00519281";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: StoreConfig,
    pub reporting: ReportingConfig,
    pub metrics: MetricsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Requests running longer than this get a 408 and their session back in the pool
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Where the precipitation window ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceDateMode {
    /// Always `reporting.reference_date`
    Fixed,
    /// Latest date in the store, falling back to `reference_date` when empty
    Latest,
}

/// Which station `/api/v1.0/tobs` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationMode {
    /// Always `reporting.station_id`
    Fixed,
    /// Station with the most measurements
    MostActive,
}

/// How the report routes pick their reference points.
///
/// Defaults reproduce the dataset's published API: a fixed 2017-08-23
/// reference date and station USC00519281.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    pub reference_mode: ReferenceDateMode,
    pub reference_date: ObservationDate,
    pub station_mode: StationMode,
    pub station_id: String,
    /// Precipitation look-back in days
    pub window_days: u64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            reference_mode: ReferenceDateMode::Fixed,
            reference_date: ObservationDate::from_ymd(2017, 8, 23)
                .expect("2017-08-23 is a valid date"),
            station_mode: StationMode::Fixed,
            station_id: DEFAULT_STATION_ID.to_string(),
            window_days: 365,
        }
    }
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "0.0.0.0:9000".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load from the config file (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let builder = config::Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("SURFSUP")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let cfg: ApiConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.reporting.window_days == 0 {
            return Err(ConfigError::Message(
                "reporting.window_days must be greater than zero".to_string(),
            ));
        }

        if self.reporting.reference_date.days_before(self.reporting.window_days).is_none() {
            return Err(ConfigError::Message(format!(
                "reporting.window_days {} reaches before the earliest representable date",
                self.reporting.window_days
            )));
        }

        if self.reporting.station_mode == StationMode::Fixed && self.reporting.station_id.is_empty() {
            return Err(ConfigError::Message(
                "reporting.station_id is required in fixed station mode".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }

        if self.metrics.enabled {
            self.metrics_addr()?;
        }

        Ok(())
    }

    /// Parsed Prometheus listener address
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.metrics.listen_addr.parse().map_err(|e| {
            ConfigError::Message(format!(
                "invalid metrics.listen_addr {:?}: {}",
                self.metrics.listen_addr, e
            ))
        })
    }
}
