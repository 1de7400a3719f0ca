//! Widget registry
//!
//! Provides [`WidgetRegistry`], the catalog the form renderer consults to turn a
//! `ui:widget` name into a component. The registry is an ordinary value; share
//! it as a [`SharedRegistry`] rather than through a global.

use crate::component::WidgetComponent;
use crate::core_widgets::register_core_widgets;
use crate::error::RegistryResult;
use crate::types::{WidgetRegistration, WidgetSource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry handle shared between the form renderer and discovery
pub type SharedRegistry = Arc<WidgetRegistry>;

/// Name-keyed catalog of widget registrations
///
/// Every method takes the lock once, so each call is atomic with respect to
/// the others.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: RwLock<HashMap<String, WidgetRegistration>>,
}

impl WidgetRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            widgets: RwLock::new(HashMap::new()),
        }
    }

    /// Create registry with the built-in widgets
    #[must_use]
    pub fn with_core_widgets() -> Self {
        let registry = Self::new();
        register_core_widgets(&registry);
        registry
    }

    /// Wrap in an [`Arc`] for sharing
    #[inline]
    #[must_use]
    pub fn shared(self) -> SharedRegistry {
        Arc::new(self)
    }

    /// Insert or overwrite a widget by name
    ///
    /// Overwriting is not an error; it logs a warning and returns the entry
    /// that was replaced.
    ///
    /// # Errors
    /// Returns the validation error from [`RegistrationInfo::validate`](crate::RegistrationInfo::validate).
    pub fn register_widget(
        &self,
        registration: WidgetRegistration,
    ) -> RegistryResult<Option<WidgetRegistration>> {
        registration.info.validate()?;

        let name = registration.info.name.clone();
        let source = registration.info.source;
        let previous = self.widgets.write().insert(name.clone(), registration);

        match &previous {
            Some(old) => tracing::warn!(
                widget = %name,
                previous_source = %old.info.source,
                new_source = %source,
                "widget already registered, overwriting"
            ),
            None => tracing::debug!(widget = %name, source = %source, "widget registered"),
        }

        Ok(previous)
    }

    /// Component registered under `name`
    #[must_use]
    pub fn get_widget(&self, name: &str) -> Option<Arc<dyn WidgetComponent>> {
        self.widgets
            .read()
            .get(name)
            .map(|r| Arc::clone(&r.component))
    }

    /// Full registration under `name`
    #[must_use]
    pub fn get_registration(&self, name: &str) -> Option<WidgetRegistration> {
        self.widgets.read().get(name).cloned()
    }

    /// Check if a widget is registered
    #[inline]
    #[must_use]
    pub fn has_widget(&self, name: &str) -> bool {
        self.widgets.read().contains_key(name)
    }

    /// Remove a widget; absent names are a no-op
    pub fn unregister_widget(&self, name: &str) -> Option<WidgetRegistration> {
        let removed = self.widgets.write().remove(name);
        if removed.is_some() {
            tracing::debug!(widget = %name, "widget unregistered");
        }
        removed
    }

    /// Independent snapshot of every registration
    #[must_use]
    pub fn get_all_widgets(&self) -> HashMap<String, WidgetRegistration> {
        self.widgets.read().clone()
    }

    /// Remove extension widgets
    ///
    /// With `Some(id)` only that extension's widgets go; with `None` every
    /// extension widget goes. Core and user widgets are never removed.
    /// Returns the number of widgets removed.
    pub fn clear_extension_widgets(&self, extension_id: Option<&str>) -> usize {
        let mut widgets = self.widgets.write();
        let before = widgets.len();
        widgets.retain(|_, r| !r.info.is_from_extension(extension_id));
        let removed = before - widgets.len();

        tracing::debug!(
            extension = extension_id.unwrap_or("*"),
            removed,
            "cleared extension widgets"
        );
        removed
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.widgets.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registrations with the given provenance, sorted by name
    #[must_use]
    pub fn widgets_by_source(&self, source: WidgetSource) -> Vec<WidgetRegistration> {
        let mut found: Vec<WidgetRegistration> = self
            .widgets
            .read()
            .values()
            .filter(|r| r.info.source == source)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.info.name.cmp(&b.info.name));
        found
    }

    /// Number of registered widgets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.read().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.read().is_empty()
    }
}
