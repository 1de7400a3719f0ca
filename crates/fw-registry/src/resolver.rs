//! Form-renderer integration
//!
//! Forms reference widgets by name through the `ui:widget` directive of their
//! UI schema. [`WidgetResolver`] turns that directive into a component.

use crate::component::WidgetComponent;
use crate::element::Element;
use crate::error::ResolveError;
use crate::props::WidgetProps;
use crate::registry::SharedRegistry;
use serde_json::Value;
use std::sync::Arc;

/// UI schema key naming the widget
pub const WIDGET_DIRECTIVE: &str = "ui:widget";

/// Widget used when a field declares none
pub const DEFAULT_WIDGET: &str = "text";

/// Resolves `ui:widget` directives against a registry
#[derive(Debug, Clone)]
pub struct WidgetResolver {
    registry: SharedRegistry,
    default_widget: String,
}

impl WidgetResolver {
    /// Create resolver falling back to [`DEFAULT_WIDGET`]
    #[must_use]
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            default_widget: DEFAULT_WIDGET.to_string(),
        }
    }

    /// With a different fallback widget
    #[inline]
    #[must_use]
    pub fn with_default_widget(mut self, name: impl Into<String>) -> Self {
        self.default_widget = name.into();
        self
    }

    /// Name the UI schema asks for, or the fallback
    ///
    /// # Errors
    /// [`ResolveError::InvalidDirective`] when `ui:widget` is not a string.
    pub fn widget_name<'a>(&'a self, ui_schema: &'a Value) -> Result<&'a str, ResolveError> {
        match ui_schema.get(WIDGET_DIRECTIVE) {
            None | Some(Value::Null) => Ok(&self.default_widget),
            Some(Value::String(name)) => Ok(name),
            Some(other) => Err(ResolveError::InvalidDirective(other.to_string())),
        }
    }

    /// Component for a field's UI schema
    ///
    /// # Errors
    /// - [`ResolveError::InvalidDirective`] for a malformed directive
    /// - [`ResolveError::UnknownWidget`] when nothing is registered under the name
    pub fn resolve(&self, ui_schema: &Value) -> Result<Arc<dyn WidgetComponent>, ResolveError> {
        let name = self.widget_name(ui_schema)?;
        self.registry
            .get_widget(name)
            .ok_or_else(|| ResolveError::UnknownWidget(name.to_string()))
    }

    /// Render a field, turning resolution and render failures into inline errors
    #[must_use]
    pub fn render_field(&self, props: &WidgetProps) -> Element {
        let component = match self.resolve(&props.ui_schema) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(field = %props.id, error = %e, "cannot resolve widget");
                return unresolved_element(&props.id, &e.to_string());
            }
        };

        component.render(props).unwrap_or_else(|e| {
            tracing::warn!(field = %props.id, error = %e, "widget failed to render");
            unresolved_element(&props.id, &e.to_string())
        })
    }
}

fn unresolved_element(field_id: &str, message: &str) -> Element {
    Element::node("div")
        .attr("class", "widget-unavailable")
        .attr("data-field", field_id)
        .child(Element::text(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WidgetRegistry;
    use serde_json::json;

    fn resolver() -> WidgetResolver {
        WidgetResolver::new(WidgetRegistry::with_core_widgets().shared())
    }

    #[test]
    fn missing_directive_uses_default() {
        let r = resolver();
        assert_eq!(r.widget_name(&json!({})).unwrap(), "text");
        assert!(r.resolve(&json!({})).is_ok());
    }

    #[test]
    fn custom_default_widget() {
        let r = resolver().with_default_widget("textarea");
        assert_eq!(r.widget_name(&json!({ "ui:widget": null })).unwrap(), "textarea");
    }

    #[test]
    fn unknown_widget_is_typed_error() {
        let r = resolver();
        let err = r.resolve(&json!({ "ui:widget": "rating" })).unwrap_err();
        assert_eq!(err, ResolveError::UnknownWidget("rating".into()));
    }

    #[test]
    fn non_string_directive_rejected() {
        let r = resolver();
        assert!(matches!(
            r.resolve(&json!({ "ui:widget": 3 })),
            Err(ResolveError::InvalidDirective(_))
        ));
    }

    #[test]
    fn render_field_inlines_unknown_widget() {
        let r = resolver();
        let props = WidgetProps::new("score").with_ui_schema(json!({ "ui:widget": "rating" }));
        let out = r.render_field(&props);

        assert_eq!(out.get_attr("class"), Some("widget-unavailable"));
        assert!(out.text_content().contains("rating"));
    }

    #[test]
    fn render_field_uses_registered_widget() {
        let r = resolver();
        let props = WidgetProps::new("notes")
            .with_label("Notes")
            .with_ui_schema(json!({ "ui:widget": "textarea" }));
        let out = r.render_field(&props);

        assert!(out.find_tag("textarea").is_some());
    }
}
