//! Props contract shared by every widget
//!
//! [`WidgetProps`] mirrors what the form renderer hands to a custom input:
//! the field's schema fragments, current value, display flags and the three
//! change/blur/focus callbacks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with a new field value
pub type ChangeHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Callback invoked with the field id and its current value
pub type FieldHandler = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// Interaction reported by a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetEvent {
    /// Value changed
    Change {
        /// New value
        #[serde(default)]
        value: Value,
    },
    /// Field lost focus
    Blur {
        /// Field id
        #[serde(default)]
        id: String,
        /// Value at blur time
        #[serde(default)]
        value: Value,
    },
    /// Field gained focus
    Focus {
        /// Field id
        #[serde(default)]
        id: String,
        /// Value at focus time
        #[serde(default)]
        value: Value,
    },
}

/// Props passed to a widget on every render
#[derive(Clone)]
pub struct WidgetProps {
    pub id: String,
    pub schema: Value,
    pub ui_schema: Value,
    pub value: Value,
    pub required: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub label: String,
    pub options: Value,
    pub form_context: Value,
    pub raw_errors: Option<Vec<String>>,
    pub placeholder: Option<String>,
    pub autofocus: Option<bool>,
    on_change: ChangeHandler,
    on_blur: FieldHandler,
    on_focus: FieldHandler,
}

impl WidgetProps {
    /// Create props for field `id` with empty schema, value and options
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schema: Value::Object(serde_json::Map::new()),
            ui_schema: Value::Object(serde_json::Map::new()),
            value: Value::String(String::new()),
            required: false,
            disabled: false,
            readonly: false,
            label: String::new(),
            options: Value::Object(serde_json::Map::new()),
            form_context: Value::Object(serde_json::Map::new()),
            raw_errors: None,
            placeholder: None,
            autofocus: None,
            on_change: Arc::new(|_| {}),
            on_blur: Arc::new(|_, _| {}),
            on_focus: Arc::new(|_, _| {}),
        }
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// With current value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// With JSON schema fragment
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// With UI schema fragment
    #[inline]
    #[must_use]
    pub fn with_ui_schema(mut self, ui_schema: Value) -> Self {
        self.ui_schema = ui_schema;
        self
    }

    /// With widget options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// With form context
    #[inline]
    #[must_use]
    pub fn with_form_context(mut self, form_context: Value) -> Self {
        self.form_context = form_context;
        self
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Mark as disabled
    #[inline]
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Mark as read-only
    #[inline]
    #[must_use]
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// With validation errors from the last submit
    #[inline]
    #[must_use]
    pub fn with_raw_errors(mut self, errors: Vec<String>) -> Self {
        self.raw_errors = Some(errors);
        self
    }

    /// With placeholder text
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// With autofocus flag
    #[inline]
    #[must_use]
    pub fn with_autofocus(mut self, autofocus: bool) -> Self {
        self.autofocus = Some(autofocus);
        self
    }

    /// With change callback
    #[must_use]
    pub fn on_change(mut self, handler: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_change = Arc::new(handler);
        self
    }

    /// With blur callback
    #[must_use]
    pub fn on_blur(mut self, handler: impl Fn(&str, Value) + Send + Sync + 'static) -> Self {
        self.on_blur = Arc::new(handler);
        self
    }

    /// With focus callback
    #[must_use]
    pub fn on_focus(mut self, handler: impl Fn(&str, Value) + Send + Sync + 'static) -> Self {
        self.on_focus = Arc::new(handler);
        self
    }

    /// Deliver an event to the matching callback
    pub fn emit(&self, event: WidgetEvent) {
        match event {
            WidgetEvent::Change { value } => (self.on_change)(value),
            WidgetEvent::Blur { id, value } => (self.on_blur)(&id, value),
            WidgetEvent::Focus { id, value } => (self.on_focus)(&id, value),
        }
    }

    /// `ui:options` merged over `options`, as form renderers expose them
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.ui_schema
            .get("ui:options")
            .and_then(|o| o.get(key))
            .or_else(|| self.options.get(key))
    }

    /// Serializable view of the props, without callbacks
    #[must_use]
    pub fn data(&self) -> PropsData {
        PropsData {
            id: self.id.clone(),
            schema: self.schema.clone(),
            ui_schema: self.ui_schema.clone(),
            value: self.value.clone(),
            required: self.required,
            disabled: self.disabled,
            readonly: self.readonly,
            label: self.label.clone(),
            options: self.options.clone(),
            form_context: self.form_context.clone(),
            raw_errors: self.raw_errors.clone(),
            placeholder: self.placeholder.clone(),
            autofocus: self.autofocus,
        }
    }

    /// Build props from their serializable view, with no-op callbacks
    #[must_use]
    pub fn from_data(data: PropsData) -> Self {
        Self {
            schema: data.schema,
            ui_schema: data.ui_schema,
            value: data.value,
            required: data.required,
            disabled: data.disabled,
            readonly: data.readonly,
            label: data.label,
            options: data.options,
            form_context: data.form_context,
            raw_errors: data.raw_errors,
            placeholder: data.placeholder,
            autofocus: data.autofocus,
            ..Self::new(data.id)
        }
    }
}

impl fmt::Debug for WidgetProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetProps")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("value", &self.value)
            .field("required", &self.required)
            .field("disabled", &self.disabled)
            .field("readonly", &self.readonly)
            .finish_non_exhaustive()
    }
}

/// Wire form of [`WidgetProps`] (camelCase, as form configuration spells it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropsData {
    pub id: String,
    #[serde(default)]
    pub schema: Value,
    #[serde(default)]
    pub ui_schema: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Value,
    #[serde(default)]
    pub form_context: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autofocus: Option<bool>,
}
