//! Registration data model
//!
//! Wire-facing types use camelCase so they match what the extension backend
//! serves.

use crate::component::WidgetComponent;
use crate::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Provenance of a registered widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSource {
    /// Shipped with the application
    #[default]
    Core,
    /// Contributed by an extension, removable in bulk
    Extension,
    /// Registered by the end user
    User,
}

impl WidgetSource {
    /// Lowercase name as used on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Extension => "extension",
            Self::User => "user",
        }
    }
}

impl fmt::Display for WidgetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata, never interpreted by the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl WidgetMetadata {
    /// Metadata with only a display name
    #[must_use]
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A registration without its component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInfo {
    /// Unique lookup key, referenced from `ui:widget`
    pub name: String,
    #[serde(default)]
    pub metadata: WidgetMetadata,
    #[serde(default)]
    pub source: WidgetSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_id: Option<String>,
}

impl RegistrationInfo {
    /// Core registration
    #[must_use]
    pub fn core(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: WidgetMetadata::default(),
            source: WidgetSource::Core,
            extension_id: None,
        }
    }

    /// User registration
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            source: WidgetSource::User,
            ..Self::core(name)
        }
    }

    /// Extension registration
    #[must_use]
    pub fn extension(name: impl Into<String>, extension_id: impl Into<String>) -> Self {
        Self {
            source: WidgetSource::Extension,
            extension_id: Some(extension_id.into()),
            ..Self::core(name)
        }
    }

    /// With metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: WidgetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check the provenance invariants
    ///
    /// # Errors
    /// - [`RegistryError::EmptyName`] for a blank name
    /// - [`RegistryError::MissingExtensionId`] for extension widgets without an id
    /// - [`RegistryError::UnexpectedExtensionId`] for core/user widgets with an id
    pub fn validate(&self) -> RegistryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        match (self.source, &self.extension_id) {
            (WidgetSource::Extension, None) => Err(RegistryError::MissingExtensionId {
                name: self.name.clone(),
            }),
            (WidgetSource::Extension, Some(id)) if id.trim().is_empty() => {
                Err(RegistryError::MissingExtensionId {
                    name: self.name.clone(),
                })
            }
            (WidgetSource::Core | WidgetSource::User, Some(id)) => {
                Err(RegistryError::UnexpectedExtensionId {
                    name: self.name.clone(),
                    source_kind: self.source.to_string(),
                    extension_id: id.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether this registration belongs to the given extension
    #[must_use]
    pub fn is_from_extension(&self, extension_id: Option<&str>) -> bool {
        self.source == WidgetSource::Extension
            && extension_id.map_or(true, |id| self.extension_id.as_deref() == Some(id))
    }
}

/// One installed widget
#[derive(Debug, Clone)]
pub struct WidgetRegistration {
    pub info: RegistrationInfo,
    pub component: Arc<dyn WidgetComponent>,
}

impl WidgetRegistration {
    /// Pair registration info with a component
    #[inline]
    #[must_use]
    pub fn new(info: RegistrationInfo, component: Arc<dyn WidgetComponent>) -> Self {
        Self { info, component }
    }

    /// Widget name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Widget provenance
    #[inline]
    #[must_use]
    pub fn source(&self) -> WidgetSource {
        self.info.source
    }
}

/// Fetched widget source that has not been evaluated yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalWidgetSource {
    pub source_code: String,
    pub registration: RegistrationInfo,
    /// Declared package requirements, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_accepts_well_formed() {
        assert!(RegistrationInfo::core("text").validate().is_ok());
        assert!(RegistrationInfo::user("mine").validate().is_ok());
        assert!(RegistrationInfo::extension("rating", "ext1").validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert_eq!(
            RegistrationInfo::core("  ").validate(),
            Err(RegistryError::EmptyName)
        );
    }

    #[test]
    fn validate_rejects_extension_without_id() {
        let mut info = RegistrationInfo::extension("rating", "ext1");
        info.extension_id = None;
        assert!(matches!(
            info.validate(),
            Err(RegistryError::MissingExtensionId { .. })
        ));
    }

    #[test]
    fn validate_rejects_core_with_extension_id() {
        let mut info = RegistrationInfo::core("text");
        info.extension_id = Some("ext1".into());
        assert!(matches!(
            info.validate(),
            Err(RegistryError::UnexpectedExtensionId { .. })
        ));
    }

    #[test]
    fn is_from_extension_filters() {
        let info = RegistrationInfo::extension("rating", "ext1");
        assert!(info.is_from_extension(None));
        assert!(info.is_from_extension(Some("ext1")));
        assert!(!info.is_from_extension(Some("ext2")));
        assert!(!RegistrationInfo::core("text").is_from_extension(None));
    }

    #[test]
    fn external_source_parses_wire_format() {
        let src: ExternalWidgetSource = serde_json::from_value(json!({
            "sourceCode": "module.exports = () => null;",
            "registration": {
                "name": "rating",
                "metadata": { "displayName": "Rating", "category": "input" },
                "source": "extension",
                "extensionId": "ext1"
            },
            "dependencies": { "react": "^18" }
        }))
        .unwrap();

        assert_eq!(src.registration.source, WidgetSource::Extension);
        assert_eq!(src.registration.extension_id.as_deref(), Some("ext1"));
        assert_eq!(src.registration.metadata.display_name.as_deref(), Some("Rating"));
        assert_eq!(src.dependencies.unwrap()["react"], "^18");
    }
}
