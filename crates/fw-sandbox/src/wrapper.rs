//! Failure boundary for dynamically loaded widgets
//!
//! A wrapped widget never fails its caller. Errors and panics become an
//! inline error element, and the failure is remembered for the props that
//! caused it so the broken widget is not re-run on every render.

use fw_registry::{ComponentKind, Element, RenderError, WidgetComponent, WidgetProps};
use parking_lot::Mutex;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

const ERROR_STYLE: &str =
    "border: 1px solid #d32f2f; border-radius: 4px; color: #d32f2f; padding: 8px; margin: 4px 0";

#[derive(Debug, Clone)]
struct FailedRender {
    id: String,
    value: Value,
    message: String,
}

impl FailedRender {
    fn matches(&self, props: &WidgetProps) -> bool {
        self.id == props.id && self.value == props.value
    }
}

/// Error-isolating wrapper around another component
#[derive(Debug)]
pub struct SandboxedWidget {
    inner: Arc<dyn WidgetComponent>,
    name: Option<String>,
    state: Mutex<Option<FailedRender>>,
}

impl SandboxedWidget {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: Arc<dyn WidgetComponent>) -> Self {
        Self {
            inner,
            name: None,
            state: Mutex::new(None),
        }
    }

    /// Wrap `inner`, naming it in error output and logs
    #[must_use]
    pub fn named(inner: Arc<dyn WidgetComponent>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(inner)
        }
    }

    /// Wrap `inner` as a shared component
    #[must_use]
    pub fn wrap(inner: Arc<dyn WidgetComponent>) -> Arc<dyn WidgetComponent> {
        Arc::new(Self::new(inner))
    }

    /// Whether the last render failed
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Message of the last failed render
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.state.lock().as_ref().map(|f| f.message.clone())
    }

    fn error_element(&self, message: &str) -> Element {
        let title = match &self.name {
            Some(name) => format!("Widget '{name}' failed to render"),
            None => "Widget failed to render".to_string(),
        };
        Element::node("div")
            .attr("class", "widget-error")
            .attr("role", "alert")
            .attr("style", ERROR_STYLE)
            .child(Element::node("strong").child(Element::text(title)))
            .child(Element::node("p").child(Element::text(message)))
    }

    fn render_inner(&self, props: &WidgetProps) -> Result<Element, RenderError> {
        catch_unwind(AssertUnwindSafe(|| self.inner.render(props)))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))))
    }
}

impl WidgetComponent for SandboxedWidget {
    fn render(&self, props: &WidgetProps) -> Result<Element, RenderError> {
        {
            let mut state = self.state.lock();
            match state.as_ref() {
                Some(failed) if failed.matches(props) => {
                    return Ok(self.error_element(&failed.message));
                }
                Some(_) => {
                    debug!(widget = ?self.name, field = %props.id, "props changed, retrying widget");
                    *state = None;
                }
                None => {}
            }
        }

        match self.render_inner(props) {
            Ok(element) => Ok(element),
            Err(e) => {
                let message = e.message().to_string();
                warn!(widget = ?self.name, field = %props.id, error = %e, "widget render failed");
                *self.state.lock() = Some(FailedRender {
                    id: props.id.clone(),
                    value: props.value.clone(),
                    message: message.clone(),
                });
                Ok(self.error_element(&message))
            }
        }
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Sandboxed
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
