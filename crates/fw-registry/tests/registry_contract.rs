//! Registry contract tests
//!
//! Lookup, overwrite, bulk-removal and snapshot semantics as seen by the
//! form renderer and the discovery service.

use fw_registry::prelude::*;
use fw_registry::{same_component, WidgetResolver};
use fw_test_utils::{
    core_registration, extension_registration, props, static_widget, user_registration,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_registered_widget_is_retrievable() {
    let registry = WidgetRegistry::new();
    let component = static_widget("hello");
    registry
        .register_widget(WidgetRegistration::new(
            RegistrationInfo::user("greeting"),
            Arc::clone(&component),
        ))
        .unwrap();

    assert!(registry.has_widget("greeting"));
    assert!(same_component(&registry.get_widget("greeting").unwrap(), &component));
}

#[test]
fn test_second_registration_wins() {
    let registry = WidgetRegistry::new();
    let replacement = static_widget("v2");

    registry.register_widget(core_registration("dup")).unwrap();
    let previous = registry
        .register_widget(WidgetRegistration::new(
            RegistrationInfo::core("dup"),
            Arc::clone(&replacement),
        ))
        .unwrap();

    assert!(previous.is_some());
    let out = registry.get_widget("dup").unwrap().render(&props("x", "X")).unwrap();
    assert_eq!(out.text_content(), "v2");
}

#[test]
fn test_clear_one_extension() {
    let registry = WidgetRegistry::new();
    registry.register_widget(core_registration("core-widget")).unwrap();
    registry.register_widget(extension_registration("ext1-widget", "ext1")).unwrap();
    registry.register_widget(extension_registration("ext2-widget", "ext2")).unwrap();

    registry.clear_extension_widgets(Some("ext1"));

    assert!(registry.has_widget("core-widget"));
    assert!(!registry.has_widget("ext1-widget"));
    assert!(registry.has_widget("ext2-widget"));
}

#[test]
fn test_clear_all_extensions() {
    let registry = WidgetRegistry::new();
    registry.register_widget(core_registration("core-widget")).unwrap();
    registry.register_widget(user_registration("user-widget")).unwrap();
    registry.register_widget(extension_registration("a", "ext1")).unwrap();
    registry.register_widget(extension_registration("b", "ext2")).unwrap();

    let removed = registry.clear_extension_widgets(None);

    assert_eq!(removed, 2);
    assert!(registry.has_widget("core-widget"));
    assert!(registry.has_widget("user-widget"));
    assert!(registry.widgets_by_source(WidgetSource::Extension).is_empty());
}

#[test]
fn test_snapshot_mutation_does_not_leak() {
    let registry = WidgetRegistry::new();
    registry.register_widget(core_registration("kept")).unwrap();

    let mut snapshot = registry.get_all_widgets();
    snapshot.clear();

    assert!(registry.has_widget("kept"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_resolver_sees_extension_widgets_after_registration() {
    let registry = WidgetRegistry::with_core_widgets().shared();
    let resolver = WidgetResolver::new(Arc::clone(&registry));
    let field = props("score", "Score").with_ui_schema(json!({ "ui:widget": "rating" }));

    assert!(resolver.resolve(&field.ui_schema).is_err());

    registry.register_widget(extension_registration("rating", "ext1")).unwrap();
    assert_eq!(resolver.render_field(&field).text_content(), "rating");

    registry.clear_extension_widgets(Some("ext1"));
    assert!(resolver.resolve(&field.ui_schema).is_err());
}
