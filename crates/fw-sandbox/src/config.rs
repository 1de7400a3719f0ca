//! Sandbox configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Modules the runtime can provide to widget code
pub const AVAILABLE_MODULES: &[&str] = &["react", "@mui/material", "@mui/icons-material"];

/// Limits and capabilities for evaluated widget code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Largest accepted widget source, in bytes
    pub max_source_bytes: usize,
    /// CPU deadline per evaluation or render, in milliseconds
    pub timeout_ms: u64,
    /// Module names widget code may `require`
    pub allowed_modules: Vec<String>,
}

impl SandboxConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With CPU deadline
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With maximum source size
    #[inline]
    #[must_use]
    pub fn with_max_source_bytes(mut self, max: usize) -> Self {
        self.max_source_bytes = max;
        self
    }

    /// With a different module allow-list
    #[must_use]
    pub fn with_allowed_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// CPU deadline as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether widget code may `require(name)`
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.allowed_modules.iter().any(|m| m == name)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_source_bytes: 64 * 1024,
            timeout_ms: 2_000,
            allowed_modules: AVAILABLE_MODULES.iter().map(|m| (*m).to_string()).collect(),
        }
    }
}
