//! Extension index abstraction

use crate::error::DiscoveryResult;
use async_trait::async_trait;
use fw_registry::ExternalWidgetSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One widget file advertised by an extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetFileDescriptor {
    /// File name, used to fetch the source
    pub name: String,
    /// Backend id of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Free-form metadata published with the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Process model the extension belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_model_id: Option<String>,
}

impl WidgetFileDescriptor {
    /// Descriptor with only a file name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            metadata: None,
            process_model_id: None,
        }
    }
}

/// Backend that knows which extensions ship widgets and serves their source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtensionSource: Send + Sync {
    /// Ids of extensions that advertise custom widgets
    async fn list_widget_extensions(&self) -> DiscoveryResult<Vec<String>>;

    /// Widget files published by one extension
    async fn list_widget_files(&self, extension_id: &str)
        -> DiscoveryResult<Vec<WidgetFileDescriptor>>;

    /// Source and registration info for one widget file
    async fn fetch_widget_source(
        &self,
        extension_id: &str,
        file_name: &str,
    ) -> DiscoveryResult<ExternalWidgetSource>;
}
