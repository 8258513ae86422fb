//! Layered configuration.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `NODEWATCH__*` environment variables, `__` separating sections
//!
//! ```toml
//! [api]
//! base_url = "http://monitor.internal:8080/api/fobr/system_health"
//! timeout_secs = 10
//!
//! [dashboard]
//! range = "24h"
//! refresh_secs = 30
//!
//! [logging]
//! directory = "/var/log/nodewatch"
//! filter = "nodewatch=debug,info"
//!
//! [thresholds]
//! cpu_warning = 65
//! ```
//!
//! e.g. `NODEWATCH__THRESHOLDS__CPU_CRITICAL=80`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::data::timerange::RangeToken;
use crate::data::Thresholds;

/// Prefix of the environment overrides.
pub const ENV_PREFIX: &str = "NODEWATCH";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
    pub logging: LoggingSettings,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: nodewatch_client::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Initial range token (`1h`, `6h`, `24h`, anything else for full history).
    pub range: String,
    pub refresh_secs: u64,
    /// Node/application inventory shown in the Applications view.
    pub inventory: Option<PathBuf>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            range: RangeToken::default().to_string(),
            refresh_secs: 30,
            inventory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Where the TUI writes its daily log files.
    pub directory: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join("nodewatch"),
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building configuration")?;

        config.try_deserialize().context("invalid configuration")
    }

    pub fn range_token(&self) -> RangeToken {
        RangeToken::parse(&self.dashboard.range)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard.refresh_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }
}
