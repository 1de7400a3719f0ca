//! End-to-end behaviour of evaluated widgets inside the registry

use fw_registry::prelude::*;
use fw_registry::{ComponentKind, WidgetEvent};
use fw_sandbox::{SandboxConfig, SandboxError, SandboxEvaluator, SandboxedWidget};
use fw_test_utils::{
    external_source, props, safe_widget_props, DOM_WIDGET_SOURCE, EMITTING_WIDGET_SOURCE,
    LOAD_FAILURE_SOURCE, MUI_WIDGET_SOURCE, SAFE_WIDGET_SOURCE, THROWING_WIDGET_SOURCE,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_dom_access_yields_no_component() {
    let evaluator = SandboxEvaluator::default();
    assert!(evaluator.evaluate(DOM_WIDGET_SOURCE).is_none());
}

#[test]
fn test_safe_widget_renders_label() {
    let evaluator = SandboxEvaluator::default();
    let component = evaluator.evaluate(SAFE_WIDGET_SOURCE).expect("safe widget loads");

    let element = component.render(&safe_widget_props()).unwrap();
    assert_eq!(element.get_attr("class"), Some("safe-widget"));
    assert!(element.text_content().contains("Safe Widget"));

    let input = element.find_tag("input").expect("input rendered");
    assert_eq!(input.get_attr("id"), Some("test"));
    assert_eq!(input.get_attr("onChange"), None);
}

#[test]
fn test_wrapper_shows_thrown_message() {
    let evaluator = SandboxEvaluator::default();
    let component = evaluator.evaluate(THROWING_WIDGET_SOURCE).expect("module loads");
    let widget = SandboxedWidget::wrap(component);

    let element = widget.render(&props("amount", "Amount")).unwrap();
    assert_eq!(element.get_attr("role"), Some("alert"));
    assert!(element.text_content().contains("widget exploded: amount"));
    assert_eq!(widget.kind(), ComponentKind::Sandboxed);
}

#[test]
fn test_component_library_maps_to_plain_elements() {
    let component = SandboxEvaluator::default()
        .evaluate(MUI_WIDGET_SOURCE)
        .expect("module loads");

    let element = component
        .render(
            &props("amount", "Amount")
                .with_value(json!(42))
                .required(true)
                .with_raw_errors(vec!["too large".into()]),
        )
        .unwrap();

    let html = element.to_html();
    assert!(html.contains("MuiBox amount"));
    assert!(html.contains(r#"value="42""#));
    assert!(html.contains("Amount *"));
    assert!(html.contains("too large"));
}

#[test]
fn test_render_time_callbacks_reach_host() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let changes = Arc::clone(&events);
    let focuses = Arc::clone(&events);

    let props = props("country", "Country")
        .with_value(json!(""))
        .with_options(json!({ "defaultValue": "NZ" }))
        .on_change(move |value| changes.lock().push(WidgetEvent::Change { value }))
        .on_focus(move |id, value| {
            focuses.lock().push(WidgetEvent::Focus {
                id: id.to_string(),
                value,
            });
        });

    let component = SandboxEvaluator::default()
        .evaluate(EMITTING_WIDGET_SOURCE)
        .expect("module loads");
    component.render(&props).unwrap();

    assert_eq!(
        *events.lock(),
        vec![
            WidgetEvent::Change { value: json!("NZ") },
            WidgetEvent::Focus {
                id: "country".into(),
                value: json!("")
            },
        ]
    );
}

#[test]
fn test_module_load_failure_is_evaluation_error() {
    let err = SandboxEvaluator::default()
        .try_evaluate(LOAD_FAILURE_SOURCE)
        .unwrap_err();
    assert!(matches!(err, SandboxError::Evaluation(ref m) if m == "cannot initialise"));
}

#[test]
fn test_disallowed_module_is_rejected() {
    let evaluator = SandboxEvaluator::new(SandboxConfig::default().with_allowed_modules(["react"]));
    let err = evaluator.try_evaluate(MUI_WIDGET_SOURCE).unwrap_err();
    assert!(matches!(err, SandboxError::DisallowedImport(ref m) if m == "@mui/material"));
}

#[test]
fn test_runaway_render_is_contained() {
    let source = "module.exports = function Spin() { for (;;) {} };";
    let evaluator =
        SandboxEvaluator::new(SandboxConfig::default().with_timeout(Duration::from_millis(200)));
    let widget = SandboxedWidget::wrap(evaluator.evaluate(source).expect("module loads"));

    let element = widget.render(&props("spin", "Spin")).unwrap();
    assert!(element.text_content().contains("200ms"));
}

#[test]
fn test_evaluated_widget_registers_as_extension() {
    let registry = WidgetRegistry::with_core_widgets();
    let fetched = external_source("safe", "ext-a", SAFE_WIDGET_SOURCE);

    let component = SandboxEvaluator::default()
        .evaluate(&fetched.source_code)
        .expect("module loads");
    registry
        .register_widget(WidgetRegistration::new(
            fetched.registration,
            SandboxedWidget::wrap(component),
        ))
        .unwrap();

    let widget = registry.get_widget("safe").unwrap();
    let html = widget.render(&safe_widget_props()).unwrap().to_html();
    assert!(html.contains("Safe Widget"));
    assert_eq!(registry.clear_extension_widgets(Some("ext-a")), 1);
    assert!(registry.has_widget("text"));
}
