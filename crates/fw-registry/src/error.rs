//! Error types for the widget registry
//!
//! Provides typed errors for:
//! - Registration validation (fail fast, before a widget is stored)
//! - Render failures raised by widget components
//! - Widget resolution from form UI directives

/// Errors raised while validating a registration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Widget name is empty or whitespace
    #[error("widget name must not be empty")]
    EmptyName,

    /// Extension widget registered without the contributing extension
    #[error("extension widget '{name}' has no extension id")]
    MissingExtensionId {
        /// Offending widget name
        name: String,
    },

    /// Extension id supplied on a core or user widget
    #[error("widget '{name}' has source '{source_kind}' but carries extension id '{extension_id}'")]
    UnexpectedExtensionId {
        /// Offending widget name
        name: String,
        /// Declared provenance
        source_kind: String,
        /// The stray extension id
        extension_id: String,
    },
}

/// Errors raised by a widget while rendering
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Widget logic rejected the props or failed internally
    #[error("{0}")]
    Failed(String),

    /// Script widget threw inside its sandbox
    #[error("script error: {0}")]
    Script(String),

    /// Sandbox could not run the widget at all
    #[error("sandbox error: {0}")]
    Sandbox(String),

    /// Widget panicked while rendering
    #[error("widget panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    /// Create a generic render failure
    #[inline]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Message text without the variant prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Failed(m) | Self::Script(m) | Self::Sandbox(m) | Self::Panicked(m) => m,
        }
    }
}

/// Errors raised while resolving a widget from form configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The `ui:widget` directive names an unregistered widget
    #[error("unknown widget: '{0}'")]
    UnknownWidget(String),

    /// The `ui:widget` directive is not a string
    #[error("invalid ui:widget directive: {0}")]
    InvalidDirective(String),
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_display() {
        let err = RegistryError::MissingExtensionId {
            name: "rating".to_string(),
        };
        assert_eq!(err.to_string(), "extension widget 'rating' has no extension id");
    }

    #[test]
    fn render_error_message_strips_prefix() {
        let err = RenderError::Script("boom".to_string());
        assert_eq!(err.to_string(), "script error: boom");
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::UnknownWidget("missing".to_string());
        assert_eq!(err.to_string(), "unknown widget: 'missing'");
    }
}
