//! Testing utilities for the form widgets workspace
//!
//! Shared fixtures: props builders, widget sources and instrumented widgets.

#![allow(missing_docs)]

use fw_registry::{
    Element, ExternalWidgetSource, FnWidget, RegistrationInfo, RenderError, WidgetComponent,
    WidgetMetadata, WidgetProps, WidgetRegistration,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Widget module that only uses `react`
pub const SAFE_WIDGET_SOURCE: &str = r#"
const React = require('react');

function SafeWidget(props) {
  return React.createElement(
    'div',
    { className: 'safe-widget', id: props.id },
    React.createElement('label', { htmlFor: props.id }, props.label),
    React.createElement('input', {
      id: props.id,
      value: props.value,
      disabled: props.disabled,
      onChange: (e) => props.onChange(e.target.value),
    })
  );
}

module.exports = SafeWidget;
"#;

/// Widget module that touches the DOM
pub const DOM_WIDGET_SOURCE: &str = r#"
const React = require('react');
module.exports = function CookieWidget(props) {
  document.cookie = "x";
  return React.createElement('span', null, props.label);
};
"#;

/// Widget module using the component-library subset
pub const MUI_WIDGET_SOURCE: &str = r#"
const React = require('react');
const { TextField, Box } = require('@mui/material');

module.exports = function AmountWidget(props) {
  return React.createElement(
    Box,
    { className: 'amount' },
    React.createElement(TextField, {
      id: props.id,
      label: props.label,
      value: props.value,
      required: props.required,
      helperText: props.rawErrors ? props.rawErrors.join(', ') : undefined,
    })
  );
};
"#;

/// Widget module that throws during render
pub const THROWING_WIDGET_SOURCE: &str = r#"
const React = require('react');
module.exports = function Broken(props) {
  throw new Error('widget exploded: ' + props.id);
};
"#;

/// Widget module whose export is not callable
pub const NOT_CALLABLE_SOURCE: &str = r#"
module.exports = { render: 'nope' };
"#;

/// Widget module that throws while loading
pub const LOAD_FAILURE_SOURCE: &str = r#"
const React = require('react');
throw new Error('cannot initialise');
"#;

/// Widget module that reports a change during render
pub const EMITTING_WIDGET_SOURCE: &str = r#"
const React = require('react');
module.exports = function Defaulting(props) {
  if (props.value === '') {
    props.onChange(props.options.defaultValue);
  }
  props.onFocus(props.id, props.value);
  return React.createElement('span', null, String(props.value));
};
"#;

/// Props matching the safe-widget render check
#[must_use]
pub fn safe_widget_props() -> WidgetProps {
    WidgetProps::new("test")
        .with_label("Safe Widget")
        .with_value(serde_json::Value::String(String::new()))
}

/// Plain props with id and label
#[must_use]
pub fn props(id: &str, label: &str) -> WidgetProps {
    WidgetProps::new(id).with_label(label)
}

/// Component that renders fixed text
#[must_use]
pub fn static_widget(text: &str) -> Arc<dyn WidgetComponent> {
    let text = text.to_string();
    FnWidget::shared(move |_| Ok(Element::text(text.clone())))
}

/// Component that always fails with `message`
#[must_use]
pub fn failing_widget(message: &str) -> Arc<dyn WidgetComponent> {
    let message = message.to_string();
    FnWidget::shared(move |_| Err(RenderError::failed(message.clone())))
}

/// Component that panics with `message`
#[must_use]
pub fn panicking_widget(message: &'static str) -> Arc<dyn WidgetComponent> {
    FnWidget::shared(move |_: &WidgetProps| -> Result<Element, RenderError> {
        panic!("{message}")
    })
}

/// Core registration with a static widget
#[must_use]
pub fn core_registration(name: &str) -> WidgetRegistration {
    WidgetRegistration::new(RegistrationInfo::core(name), static_widget(name))
}

/// User registration with a static widget
#[must_use]
pub fn user_registration(name: &str) -> WidgetRegistration {
    WidgetRegistration::new(RegistrationInfo::user(name), static_widget(name))
}

/// Extension registration with a static widget
#[must_use]
pub fn extension_registration(name: &str, extension_id: &str) -> WidgetRegistration {
    WidgetRegistration::new(
        RegistrationInfo::extension(name, extension_id),
        static_widget(name),
    )
}

/// Fetched source for an extension widget
#[must_use]
pub fn external_source(name: &str, extension_id: &str, code: &str) -> ExternalWidgetSource {
    ExternalWidgetSource {
        source_code: code.to_string(),
        registration: RegistrationInfo::extension(name, extension_id)
            .with_metadata(WidgetMetadata::named(name)),
        dependencies: None,
    }
}

/// Component that fails until its `value` prop changes, counting attempts
#[derive(Debug, Default)]
pub struct FlakyWidget {
    attempts: AtomicUsize,
    poisoned_value: Mutex<Option<serde_json::Value>>,
}

impl FlakyWidget {
    /// Fail whenever `value` equals `poisoned`
    #[must_use]
    pub fn failing_on(poisoned: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicUsize::new(0),
            poisoned_value: Mutex::new(Some(poisoned)),
        })
    }

    /// Render attempts so far
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl WidgetComponent for FlakyWidget {
    fn render(&self, props: &WidgetProps) -> Result<Element, RenderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.poisoned_value.lock().as_ref() == Some(&props.value) {
            return Err(RenderError::failed(format!("bad value {}", props.value)));
        }
        Ok(Element::text(props.label.clone()))
    }
}
