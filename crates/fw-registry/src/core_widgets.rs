//! Built-in widgets
//!
//! Registered at startup with `source = core`, so extension reloads never
//! remove them.

use crate::component::{FnWidget, WidgetComponent};
use crate::element::Element;
use crate::error::RenderError;
use crate::props::WidgetProps;
use crate::registry::WidgetRegistry;
use crate::types::{RegistrationInfo, WidgetMetadata, WidgetRegistration};
use serde_json::Value;
use std::sync::Arc;

/// Names of the built-in widgets
pub const CORE_WIDGET_NAMES: &[&str] = &["text", "textarea", "checkbox", "select", "markdown-note"];

/// Register every built-in widget into `registry`
pub fn register_core_widgets(registry: &WidgetRegistry) {
    let builtins: [(&str, &str, Arc<dyn WidgetComponent>); 5] = [
        ("text", "Text", FnWidget::shared(text_widget)),
        ("textarea", "Text Area", FnWidget::shared(textarea_widget)),
        ("checkbox", "Checkbox", FnWidget::shared(checkbox_widget)),
        ("select", "Select", FnWidget::shared(select_widget)),
        ("markdown-note", "Note", FnWidget::shared(note_widget)),
    ];

    for (name, display, component) in builtins {
        let info = RegistrationInfo::core(name)
            .with_metadata(WidgetMetadata::named(display).with_category("core"));
        if let Err(e) = registry.register_widget(WidgetRegistration::new(info, component)) {
            tracing::error!(widget = name, error = %e, "failed to register core widget");
        }
    }
}

/// Label, control and error list wrapped in a field container
fn field(props: &WidgetProps, control: Element) -> Element {
    let mut label = Element::node("label")
        .attr("for", props.id.as_str())
        .child(Element::text(props.label.as_str()));
    if props.required {
        label = label.child(Element::node("span").attr("class", "required").child(Element::text("*")));
    }

    let mut container = Element::node("div")
        .attr("class", "form-field")
        .child(label)
        .child(control);

    if let Some(errors) = props.raw_errors.as_ref().filter(|e| !e.is_empty()) {
        container = container.child(
            Element::node("ul")
                .attr("class", "field-errors")
                .children(errors.iter().map(|e| Element::node("li").child(Element::text(e.as_str())))),
        );
    }
    container
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn control(tag: &str, props: &WidgetProps) -> Element {
    let mut el = Element::node(tag)
        .attr("id", props.id.as_str())
        .attr("name", props.id.as_str())
        .flag("required", props.required)
        .flag("disabled", props.disabled)
        .flag("readonly", props.readonly)
        .flag("autofocus", props.autofocus.unwrap_or(false));
    if let Some(placeholder) = &props.placeholder {
        el = el.attr("placeholder", placeholder.as_str());
    }
    el
}

fn text_widget(props: &WidgetProps) -> Result<Element, RenderError> {
    let input = control("input", props)
        .attr("type", "text")
        .attr("value", value_text(&props.value));
    Ok(field(props, input))
}

fn textarea_widget(props: &WidgetProps) -> Result<Element, RenderError> {
    let rows = props
        .option("rows")
        .and_then(Value::as_u64)
        .unwrap_or(3);
    let area = control("textarea", props)
        .attr("rows", rows.to_string())
        .child(Element::text(value_text(&props.value)));
    Ok(field(props, area))
}

fn checkbox_widget(props: &WidgetProps) -> Result<Element, RenderError> {
    let checked = match &props.value {
        Value::Bool(b) => *b,
        Value::Null => false,
        other => {
            return Err(RenderError::failed(format!(
                "checkbox expects a boolean value, got {other}"
            )))
        }
    };
    let input = control("input", props)
        .attr("type", "checkbox")
        .flag("checked", checked);
    Ok(field(props, input))
}

fn select_widget(props: &WidgetProps) -> Result<Element, RenderError> {
    let options = props
        .option("enumOptions")
        .and_then(Value::as_array)
        .ok_or_else(|| RenderError::failed("select requires enumOptions"))?;

    let current = value_text(&props.value);
    let mut select = control("select", props);
    for opt in options {
        let value = opt.get("value").map(value_text).unwrap_or_default();
        let label = opt
            .get("label")
            .and_then(Value::as_str)
            .map_or_else(|| value.clone(), str::to_string);
        select = select.child(
            Element::node("option")
                .attr("value", value.as_str())
                .flag("selected", value == current)
                .child(Element::text(label)),
        );
    }
    Ok(field(props, select))
}

fn note_widget(props: &WidgetProps) -> Result<Element, RenderError> {
    let mut note = Element::node("div")
        .attr("class", "form-note")
        .attr("id", props.id.as_str())
        .child(Element::node("strong").child(Element::text(props.label.as_str())));
    if let Some(description) = props.schema.get("description").and_then(Value::as_str) {
        note = note.child(Element::node("p").child(Element::text(description)));
    }
    Ok(note)
}
