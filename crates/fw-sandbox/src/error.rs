//! Error types for widget evaluation
//!
//! Callers of [`SandboxEvaluator::evaluate`](crate::SandboxEvaluator::evaluate)
//! never see these: they are logged and the widget is dropped. They surface
//! through `try_evaluate` for reporting.

use fw_registry::RenderError;

/// Reasons a widget source is rejected or fails to run
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Source exceeds the configured size limit
    #[error("widget source is {size} bytes, limit is {max}")]
    SourceTooLarge {
        /// Source size in bytes
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// Source matches a deny-listed capability pattern
    #[error("disallowed pattern '{pattern}' on line {line}")]
    DeniedPattern {
        /// Human-readable pattern label
        pattern: &'static str,
        /// 1-based line of the first match
        line: usize,
    },

    /// Source requires a module outside the allow-list
    #[error("module '{0}' is not allowed")]
    DisallowedImport(String),

    /// Source calls `require` with a computed module name
    #[error("require() must be called with a string literal")]
    DynamicRequire,

    /// Module code threw, failed to parse, or the widget threw while rendering
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Module export is not a function
    #[error("widget export is not callable (got {0})")]
    NotCallable(String),

    /// CPU deadline exceeded
    #[error("widget exceeded {timeout_ms}ms time limit")]
    Timeout {
        /// Configured deadline
        timeout_ms: u64,
    },

    /// Isolate could not be created or its thread died
    #[error("isolate failure: {0}")]
    Isolate(String),

    /// Result envelope missing or malformed
    #[error("sandbox protocol error: {0}")]
    Protocol(String),

    /// JSON encoding or decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SandboxError {
    /// Whether the source was refused before reaching the isolate
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SourceTooLarge { .. }
                | Self::DeniedPattern { .. }
                | Self::DisallowedImport(_)
                | Self::DynamicRequire
        )
    }
}

impl From<SandboxError> for RenderError {
    fn from(err: SandboxError) -> Self {
        match err {
            SandboxError::Evaluation(message) => RenderError::Script(message),
            other => RenderError::Sandbox(other.to_string()),
        }
    }
}
