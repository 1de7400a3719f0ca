//! Extension index backed by the workflow backend's REST API
//!
//! Endpoints, relative to the configured base URL:
//! - `GET extensions/widgets`: extension ids
//! - `GET extensions/{id}/widgets`: widget file descriptors
//! - `GET extensions/{id}/widgets/{file}`: widget source and registration

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::source::{ExtensionSource, WidgetFileDescriptor};
use async_trait::async_trait;
use fw_registry::ExternalWidgetSource;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP implementation of [`ExtensionSource`]
#[derive(Debug, Clone)]
pub struct HttpExtensionSource {
    client: Client,
    base_url: Url,
}

impl HttpExtensionSource {
    /// Create a source for `base_url` with the default timeout
    ///
    /// # Errors
    /// [`DiscoveryError::InvalidBaseUrl`] if the URL cannot be parsed or
    /// cannot carry path segments.
    pub fn new(base_url: &str) -> DiscoveryResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a source with a specific per-request timeout
    ///
    /// # Errors
    /// See [`HttpExtensionSource::new`]; also fails if the client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> DiscoveryResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|_| DiscoveryError::InvalidBaseUrl(base_url.into()))?;
        if base_url.cannot_be_a_base() {
            return Err(DiscoveryError::InvalidBaseUrl(base_url.into()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::request(base_url.as_str(), &e))?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> DiscoveryResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DiscoveryError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> DiscoveryResult<T> {
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DiscoveryError::request(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DiscoveryError::request(url.as_str(), &e))
    }
}

#[async_trait]
impl ExtensionSource for HttpExtensionSource {
    async fn list_widget_extensions(&self) -> DiscoveryResult<Vec<String>> {
        let url = self.endpoint(&["extensions", "widgets"])?;
        self.get_json(url).await
    }

    async fn list_widget_files(
        &self,
        extension_id: &str,
    ) -> DiscoveryResult<Vec<WidgetFileDescriptor>> {
        let url = self.endpoint(&["extensions", extension_id, "widgets"])?;
        self.get_json(url).await
    }

    async fn fetch_widget_source(
        &self,
        extension_id: &str,
        file_name: &str,
    ) -> DiscoveryResult<ExternalWidgetSource> {
        let url = self.endpoint(&["extensions", extension_id, "widgets", file_name])?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_joined_and_escaped() {
        let source = HttpExtensionSource::new("http://localhost:7000/api/").unwrap();
        let url = source
            .endpoint(&["extensions", "acme forms", "widgets", "a/b.js"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:7000/api/extensions/acme%20forms/widgets/a%2Fb.js"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            HttpExtensionSource::new("not a url"),
            Err(DiscoveryError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpExtensionSource::new("mailto:ops@example.com"),
            Err(DiscoveryError::InvalidBaseUrl(_))
        ));
    }
}
