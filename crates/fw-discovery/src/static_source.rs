//! In-memory extension index
//!
//! Serves a fixed set of extensions. Used for offline runs (fixture files)
//! and tests; individual files or listings can be marked broken to exercise
//! failure isolation.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::source::{ExtensionSource, WidgetFileDescriptor};
use async_trait::async_trait;
use fw_registry::ExternalWidgetSource;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
struct StaticExtension {
    #[serde(default)]
    widgets: BTreeMap<String, ExternalWidgetSource>,
}

/// Fixture-backed [`ExtensionSource`]
///
/// Fixture JSON shape:
///
/// ```json
/// { "extensions": { "<id>": { "widgets": { "<file>": { "sourceCode": "...", "registration": { ... } } } } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticExtensionSource {
    #[serde(default)]
    extensions: BTreeMap<String, StaticExtension>,
    #[serde(skip)]
    broken_listings: BTreeSet<String>,
    #[serde(skip)]
    broken_files: BTreeSet<(String, String)>,
    #[serde(skip)]
    latency: Option<Duration>,
}

impl StaticExtensionSource {
    /// Empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture document
    ///
    /// # Errors
    /// [`DiscoveryError::Json`] if the document does not match the fixture shape.
    pub fn from_json(json: &str) -> DiscoveryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a fixture file
    ///
    /// # Errors
    /// I/O or JSON errors.
    pub fn from_file(path: impl AsRef<Path>) -> DiscoveryResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Add a widget file to an extension, creating the extension if needed
    #[must_use]
    pub fn with_widget(
        mut self,
        extension_id: impl Into<String>,
        file_name: impl Into<String>,
        source: ExternalWidgetSource,
    ) -> Self {
        self.extensions
            .entry(extension_id.into())
            .or_default()
            .widgets
            .insert(file_name.into(), source);
        self
    }

    /// Add an extension without widget files
    #[must_use]
    pub fn with_extension(mut self, extension_id: impl Into<String>) -> Self {
        self.extensions.entry(extension_id.into()).or_default();
        self
    }

    /// Make listing an extension's files fail
    #[must_use]
    pub fn with_broken_listing(mut self, extension_id: impl Into<String>) -> Self {
        self.broken_listings.insert(extension_id.into());
        self
    }

    /// Make fetching one file fail while it is still listed
    #[must_use]
    pub fn with_broken_file(
        mut self,
        extension_id: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        self.broken_files
            .insert((extension_id.into(), file_name.into()));
        self
    }

    /// Delay every call, to keep a reload in flight
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn extension(&self, extension_id: &str) -> DiscoveryResult<&StaticExtension> {
        self.extensions
            .get(extension_id)
            .ok_or_else(|| DiscoveryError::NotFound {
                extension_id: extension_id.to_string(),
                file: String::new(),
            })
    }
}

#[async_trait]
impl ExtensionSource for StaticExtensionSource {
    async fn list_widget_extensions(&self) -> DiscoveryResult<Vec<String>> {
        self.delay().await;
        Ok(self.extensions.keys().cloned().collect())
    }

    async fn list_widget_files(
        &self,
        extension_id: &str,
    ) -> DiscoveryResult<Vec<WidgetFileDescriptor>> {
        self.delay().await;
        if self.broken_listings.contains(extension_id) {
            return Err(DiscoveryError::Status {
                url: format!("static://extensions/{extension_id}/widgets"),
                status: 500,
            });
        }
        Ok(self
            .extension(extension_id)?
            .widgets
            .keys()
            .map(WidgetFileDescriptor::named)
            .collect())
    }

    async fn fetch_widget_source(
        &self,
        extension_id: &str,
        file_name: &str,
    ) -> DiscoveryResult<ExternalWidgetSource> {
        self.delay().await;
        if self
            .broken_files
            .contains(&(extension_id.to_string(), file_name.to_string()))
        {
            return Err(DiscoveryError::Status {
                url: format!("static://extensions/{extension_id}/widgets/{file_name}"),
                status: 500,
            });
        }
        self.extension(extension_id)?
            .widgets
            .get(file_name)
            .cloned()
            .ok_or_else(|| DiscoveryError::NotFound {
                extension_id: extension_id.to_string(),
                file: file_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_test_utils::{external_source, SAFE_WIDGET_SOURCE};

    const FIXTURE: &str = r#"{
        "extensions": {
            "acme": {
                "widgets": {
                    "rating.js": {
                        "sourceCode": "module.exports = () => null;",
                        "registration": { "name": "rating", "source": "extension", "extensionId": "acme" }
                    }
                }
            },
            "empty": {}
        }
    }"#;

    #[tokio::test]
    async fn fixture_document_is_served() {
        let source = StaticExtensionSource::from_json(FIXTURE).unwrap();
        assert_eq!(
            source.list_widget_extensions().await.unwrap(),
            vec!["acme".to_string(), "empty".to_string()]
        );

        let files = source.list_widget_files("acme").await.unwrap();
        assert_eq!(files, vec![WidgetFileDescriptor::named("rating.js")]);

        let fetched = source.fetch_widget_source("acme", "rating.js").await.unwrap();
        assert_eq!(fetched.registration.name, "rating");
        assert!(source.list_widget_files("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn broken_entries_fail() {
        let source = StaticExtensionSource::new()
            .with_widget("a", "w.js", external_source("w", "a", SAFE_WIDGET_SOURCE))
            .with_broken_file("a", "w.js")
            .with_extension("b")
            .with_broken_listing("b");

        assert!(source.fetch_widget_source("a", "w.js").await.is_err());
        assert!(source.list_widget_files("b").await.is_err());
        assert!(matches!(
            source.list_widget_files("missing").await,
            Err(DiscoveryError::NotFound { .. })
        ));
    }

    #[test]
    fn fixture_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let source = StaticExtensionSource::from_file(&path).unwrap();
        assert_eq!(source.extensions.len(), 2);
    }
}
