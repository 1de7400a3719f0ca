//! Form widget registry
//!
//! The catalog behind custom inputs in workflow task forms:
//! - [`WidgetComponent`]: the contract every widget implements
//! - [`WidgetProps`]: props the form renderer passes on each render
//! - [`Element`]: the render tree a widget returns
//! - [`WidgetRegistry`]: name-keyed registrations with provenance
//! - [`WidgetResolver`]: `ui:widget` directive resolution for forms
//!
//! # Example
//!
//! ```rust
//! use fw_registry::{WidgetProps, WidgetRegistry, WidgetResolver};
//! use serde_json::json;
//!
//! let registry = WidgetRegistry::with_core_widgets().shared();
//! let resolver = WidgetResolver::new(registry);
//!
//! let props = WidgetProps::new("customer")
//!     .with_label("Customer")
//!     .with_ui_schema(json!({ "ui:widget": "text" }));
//! let html = resolver.render_field(&props).to_html();
//! assert!(html.contains("Customer"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod component;
pub mod core_widgets;
pub mod element;
pub mod error;
pub mod props;
pub mod registry;
pub mod resolver;
pub mod types;

// Re-exports for convenience
pub use component::{same_component, ComponentKind, FnWidget, WidgetComponent};
pub use core_widgets::{register_core_widgets, CORE_WIDGET_NAMES};
pub use element::{escape_html, Element};
pub use error::{RegistryError, RegistryResult, RenderError, ResolveError};
pub use props::{PropsData, WidgetEvent, WidgetProps};
pub use registry::{SharedRegistry, WidgetRegistry};
pub use resolver::{WidgetResolver, DEFAULT_WIDGET, WIDGET_DIRECTIVE};
pub use types::{
    ExternalWidgetSource, RegistrationInfo, WidgetMetadata, WidgetRegistration, WidgetSource,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with widgets
    pub use crate::{
        Element, RegistrationInfo, RenderError, SharedRegistry, WidgetComponent, WidgetProps,
        WidgetRegistration, WidgetRegistry, WidgetSource,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
