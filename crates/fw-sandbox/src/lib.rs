//! Sandboxed evaluation of extension-supplied form widgets
//!
//! Widget modules arrive as JavaScript source. Before a module becomes a
//! [`WidgetComponent`](fw_registry::WidgetComponent) it is sanitized and
//! scanned ([`validator`]), then loaded in a throwaway V8 isolate that only
//! exposes the allow-listed `react` and `@mui/*` shims. Each render runs in
//! another fresh isolate under a CPU deadline.
//!
//! [`SandboxedWidget`] wraps any component so that render failures turn into
//! an inline error element instead of reaching the form.
//!
//! ```rust,no_run
//! use fw_sandbox::{SandboxEvaluator, SandboxedWidget};
//!
//! let evaluator = SandboxEvaluator::default();
//! let source = "const React = require('react');\n\
//!               module.exports = (p) => React.createElement('b', null, p.label);";
//! if let Some(component) = evaluator.evaluate(source) {
//!     let _widget = SandboxedWidget::wrap(component);
//! }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod evaluator;
mod runtime;
pub mod validator;
pub mod wrapper;

pub use config::{SandboxConfig, AVAILABLE_MODULES};
pub use error::SandboxError;
pub use evaluator::{SandboxEvaluator, ScriptWidget};
pub use wrapper::SandboxedWidget;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for evaluating widgets
    pub use crate::{SandboxConfig, SandboxError, SandboxEvaluator, SandboxedWidget, ScriptWidget};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
