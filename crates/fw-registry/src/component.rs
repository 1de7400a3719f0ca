//! The widget component contract
//!
//! Every registered widget is an `Arc<dyn WidgetComponent>`, so the shape of a
//! component is checked when it is constructed rather than on first render.

use crate::element::Element;
use crate::error::RenderError;
use crate::props::WidgetProps;
use std::fmt;
use std::sync::Arc;

/// How a component was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Compiled into the application
    Native,
    /// Evaluated from extension source
    Script,
    /// Wrapped by the render-error boundary
    Sandboxed,
}

/// A renderable form input
pub trait WidgetComponent: Send + Sync {
    /// Render the widget for the given props
    ///
    /// # Errors
    /// Returns [`RenderError`] when the widget cannot produce output.
    fn render(&self, props: &WidgetProps) -> Result<Element, RenderError>;

    /// Provenance of the component implementation
    fn kind(&self) -> ComponentKind {
        ComponentKind::Native
    }
}

impl fmt::Debug for dyn WidgetComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidgetComponent({:?})", self.kind())
    }
}

/// Adapter turning a closure into a native component
pub struct FnWidget<F> {
    render_fn: F,
}

impl<F> FnWidget<F>
where
    F: Fn(&WidgetProps) -> Result<Element, RenderError> + Send + Sync + 'static,
{
    /// Wrap `render_fn`
    #[inline]
    #[must_use]
    pub fn new(render_fn: F) -> Self {
        Self { render_fn }
    }

    /// Wrap `render_fn` and erase the type
    #[must_use]
    pub fn shared(render_fn: F) -> Arc<dyn WidgetComponent> {
        Arc::new(Self::new(render_fn))
    }
}

impl<F> WidgetComponent for FnWidget<F>
where
    F: Fn(&WidgetProps) -> Result<Element, RenderError> + Send + Sync,
{
    fn render(&self, props: &WidgetProps) -> Result<Element, RenderError> {
        (self.render_fn)(props)
    }
}

/// Identity comparison for shared components
#[inline]
#[must_use]
pub fn same_component(a: &Arc<dyn WidgetComponent>, b: &Arc<dyn WidgetComponent>) -> bool {
    Arc::ptr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_widget_renders_closure() {
        let widget = FnWidget::shared(|props| Ok(Element::text(props.label.clone())));
        let out = widget.render(&WidgetProps::new("a").with_label("Hello")).unwrap();

        assert_eq!(out, Element::text("Hello"));
        assert_eq!(widget.kind(), ComponentKind::Native);
    }

    #[test]
    fn same_component_is_identity() {
        let a = FnWidget::shared(|_| Ok(Element::text("a")));
        let b = FnWidget::shared(|_| Ok(Element::text("a")));

        assert!(same_component(&a, &a.clone()));
        assert!(!same_component(&a, &b));
    }
}
