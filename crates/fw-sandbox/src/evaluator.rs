//! Turns widget source text into a renderable component

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::runtime::{run_isolated, Invocation};
use crate::validator;
use fw_registry::{ComponentKind, Element, RenderError, WidgetComponent, WidgetEvent, WidgetProps};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates and loads widget modules under a [`SandboxConfig`]
#[derive(Debug, Clone, Default)]
pub struct SandboxEvaluator {
    config: Arc<SandboxConfig>,
}

impl SandboxEvaluator {
    /// Create an evaluator with the given limits
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Run the static checks only, returning the sanitized source
    ///
    /// # Errors
    /// The first validation failure.
    pub fn prepare(&self, source: &str) -> Result<String, SandboxError> {
        validator::validate(source, &self.config)
    }

    /// Validate and load `source`, requiring its export to be callable
    ///
    /// # Errors
    /// - validation failures ([`SandboxError::is_rejection`])
    /// - [`SandboxError::Evaluation`] when the module throws or fails to parse
    /// - [`SandboxError::NotCallable`] when the export is not a function
    /// - [`SandboxError::Timeout`] when loading exceeds the CPU deadline
    pub fn try_evaluate(&self, source: &str) -> Result<ScriptWidget, SandboxError> {
        let sanitized = self.prepare(source)?;

        let export_type = run_isolated(&sanitized, Invocation::Check, &self.config)?;
        match export_type.as_str() {
            Some("function") => {}
            Some(other) => return Err(SandboxError::NotCallable(other.to_string())),
            None => {
                return Err(SandboxError::Protocol(format!(
                    "unexpected export descriptor: {export_type}"
                )))
            }
        }

        debug!(bytes = sanitized.len(), "widget module loaded");
        Ok(ScriptWidget {
            source: Arc::from(sanitized),
            config: Arc::clone(&self.config),
        })
    }

    /// Load `source` as a shared component, or `None` if it is rejected or broken
    ///
    /// Failures are logged and never surface to the caller.
    #[must_use]
    pub fn evaluate(&self, source: &str) -> Option<Arc<dyn WidgetComponent>> {
        match self.try_evaluate(source) {
            Ok(widget) => Some(Arc::new(widget)),
            Err(e) => {
                warn!(error = %e, rejected = e.is_rejection(), "widget source not loaded");
                None
            }
        }
    }
}

/// A validated widget module; each render runs in a fresh isolate
#[derive(Debug, Clone)]
pub struct ScriptWidget {
    source: Arc<str>,
    config: Arc<SandboxConfig>,
}

impl ScriptWidget {
    /// Sanitized module source
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Deserialize)]
struct RenderedOutput {
    element: Element,
    #[serde(default)]
    events: Vec<WidgetEvent>,
}

impl WidgetComponent for ScriptWidget {
    fn render(&self, props: &WidgetProps) -> Result<Element, RenderError> {
        let raw = run_isolated(&self.source, Invocation::Render(props.data()), &self.config)?;
        let output: RenderedOutput = serde_json::from_value(raw).map_err(SandboxError::from)?;

        for event in output.events {
            props.emit(event);
        }
        Ok(output.element)
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_test_utils::{
        safe_widget_props, DOM_WIDGET_SOURCE, NOT_CALLABLE_SOURCE, SAFE_WIDGET_SOURCE,
        THROWING_WIDGET_SOURCE,
    };

    #[test]
    fn safe_source_becomes_script_widget() {
        let evaluator = SandboxEvaluator::default();
        let widget = evaluator.try_evaluate(SAFE_WIDGET_SOURCE).unwrap();
        assert_eq!(widget.kind(), ComponentKind::Script);

        let html = widget.render(&safe_widget_props()).unwrap().to_html();
        assert!(html.contains("Safe Widget"));
    }

    #[test]
    fn denied_source_is_rejected_before_execution() {
        let evaluator = SandboxEvaluator::default();
        let err = evaluator.try_evaluate(DOM_WIDGET_SOURCE).unwrap_err();
        assert!(err.is_rejection());
        assert!(evaluator.evaluate(DOM_WIDGET_SOURCE).is_none());
    }

    #[test]
    fn non_callable_export_is_reported() {
        let evaluator = SandboxEvaluator::default();
        let err = evaluator.try_evaluate(NOT_CALLABLE_SOURCE).unwrap_err();
        assert!(matches!(err, SandboxError::NotCallable(_)));
    }

    #[test]
    fn render_error_carries_thrown_message() {
        let widget = SandboxEvaluator::default()
            .try_evaluate(THROWING_WIDGET_SOURCE)
            .unwrap();
        let err = widget.render(&safe_widget_props()).unwrap_err();
        assert_eq!(err, RenderError::Script("widget exploded: test".into()));
    }
}
