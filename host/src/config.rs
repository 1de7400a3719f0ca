//! Host configuration
//!
//! Loaded from a TOML file; every section is optional. Command-line flags
//! are applied on top with the `with_*` builders.
//!
//! ```toml
//! [sandbox]
//! timeout_ms = 1500
//! allowed_modules = ["react", "@mui/material"]
//!
//! [discovery]
//! base_url = "http://localhost:7000/api/"
//! request_timeout_ms = 5000
//!
//! [logging]
//! level = "debug"
//! json = false
//! ```

use anyhow::{Context, Result};
use fw_sandbox::SandboxConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where extension widgets come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DiscoveryConfig {
    /// Backend base URL serving the extension endpoints
    pub(crate) base_url: Option<String>,
    /// Fixture file used instead of a backend
    pub(crate) fixtures: Option<PathBuf>,
    /// Per-request HTTP timeout
    pub(crate) request_timeout_ms: u64,
}

impl DiscoveryConfig {
    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            fixtures: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub(crate) level: String,
    /// Emit JSON log lines
    pub(crate) json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete host configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct HostConfig {
    pub(crate) sandbox: SandboxConfig,
    pub(crate) discovery: DiscoveryConfig,
    pub(crate) logging: LoggingConfig,
}

impl HostConfig {
    /// Read and parse a TOML file
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    #[must_use]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.discovery.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub(crate) fn with_fixtures(mut self, path: impl Into<PathBuf>) -> Self {
        self.discovery.fixtures = Some(path.into());
        self
    }

    #[must_use]
    pub(crate) fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    #[must_use]
    pub(crate) fn with_json_logs(mut self, json: bool) -> Self {
        self.logging.json = json;
        self
    }

    #[must_use]
    pub(crate) fn with_sandbox_timeout(mut self, timeout: Duration) -> Self {
        self.sandbox = self.sandbox.with_timeout(timeout);
        self
    }
}
