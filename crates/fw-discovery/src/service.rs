//! Discovery service
//!
//! Pulls widget files from an [`ExtensionSource`], runs each through the
//! sandbox and registers the wrapped result. Files are processed concurrently
//! and fail independently: one broken file never stops its siblings.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::report::{DiscoveryReport, ExtensionFailure, FileOutcome, Stage};
use crate::source::{ExtensionSource, WidgetFileDescriptor};
use fw_registry::{
    ExternalWidgetSource, SharedRegistry, WidgetComponent, WidgetRegistration, WidgetSource,
};
use fw_sandbox::{SandboxEvaluator, SandboxedWidget};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Loads extension widgets into a registry
pub struct DiscoveryService {
    registry: SharedRegistry,
    source: Arc<dyn ExtensionSource>,
    evaluator: SandboxEvaluator,
    reload: Mutex<()>,
}

impl DiscoveryService {
    /// Create a service with the default sandbox configuration
    pub fn new(registry: SharedRegistry, source: Arc<dyn ExtensionSource>) -> Self {
        Self {
            registry,
            source,
            evaluator: SandboxEvaluator::default(),
            reload: Mutex::new(()),
        }
    }

    /// Use a specific evaluator
    #[inline]
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: SandboxEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Registry widgets are loaded into
    #[must_use]
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Whether a reload, full or single-extension, is currently running
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reload.try_lock().is_err()
    }

    /// Replace every extension widget with a fresh load from the source
    ///
    /// Existing extension widgets are cleared first; core and user widgets
    /// are left alone. Extensions whose file list cannot be fetched are
    /// recorded in the report and skipped.
    ///
    /// # Errors
    /// - [`DiscoveryError::ReloadInProgress`] if another reload is running
    /// - the source's error if the extension index itself cannot be listed
    #[instrument(skip(self))]
    pub async fn load_all_extension_widgets(&self) -> DiscoveryResult<DiscoveryReport> {
        let _guard = self
            .reload
            .try_lock()
            .map_err(|_| DiscoveryError::ReloadInProgress)?;

        let mut report = DiscoveryReport::begin();
        report.cleared = self.registry.clear_extension_widgets(None);
        debug!(cleared = report.cleared, "extension widgets cleared");

        let extensions = self.source.list_widget_extensions().await?;
        info!(count = extensions.len(), "loading extension widgets");

        let passes = extensions.iter().map(|id| self.load_listed(id));
        for (extension_id, result) in extensions.iter().zip(join_all(passes).await) {
            match result {
                Ok(outcomes) => report.outcomes.extend(outcomes),
                Err(e) => {
                    warn!(extension = %extension_id, error = %e, "could not list widget files");
                    report.failed_extensions.push(ExtensionFailure {
                        extension_id: extension_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let report = report.finish();
        info!(
            registered = report.registered().len(),
            failed = report.failed().len(),
            failed_extensions = report.failed_extensions.len(),
            "extension widget reload finished"
        );
        Ok(report)
    }

    /// Reload the widgets of a single extension
    ///
    /// The extension's previous widgets are removed once its file list has
    /// been fetched. Other extensions are not touched. Shares the reload
    /// guard with [`load_all_extension_widgets`](Self::load_all_extension_widgets),
    /// so the two never interleave.
    ///
    /// # Errors
    /// - [`DiscoveryError::ReloadInProgress`] if any reload is running
    /// - the source's error if the extension's file list cannot be fetched
    #[instrument(skip(self))]
    pub async fn load_extension_widgets(&self, extension_id: &str) -> DiscoveryResult<DiscoveryReport> {
        let _guard = self
            .reload
            .try_lock()
            .map_err(|_| DiscoveryError::ReloadInProgress)?;

        let mut report = DiscoveryReport::begin();

        let files = self.source.list_widget_files(extension_id).await?;
        report.cleared = self.registry.clear_extension_widgets(Some(extension_id));
        report.outcomes = self.load_files(extension_id, files).await;

        let report = report.finish();
        info!(
            extension = %extension_id,
            registered = report.registered().len(),
            failed = report.failed().len(),
            "extension widgets loaded"
        );
        Ok(report)
    }

    async fn load_listed(&self, extension_id: &str) -> DiscoveryResult<Vec<FileOutcome>> {
        let files = self.source.list_widget_files(extension_id).await?;
        Ok(self.load_files(extension_id, files).await)
    }

    async fn load_files(
        &self,
        extension_id: &str,
        files: Vec<WidgetFileDescriptor>,
    ) -> Vec<FileOutcome> {
        join_all(files.iter().map(|f| self.load_file(extension_id, &f.name))).await
    }

    async fn load_file(&self, extension_id: &str, file: &str) -> FileOutcome {
        let failed = |stage: Stage, reason: String| {
            warn!(extension = %extension_id, file, %stage, %reason, "widget file skipped");
            FileOutcome::failed(extension_id, file, stage, reason)
        };

        let ExternalWidgetSource {
            source_code,
            mut registration,
            ..
        } = match self.source.fetch_widget_source(extension_id, file).await {
            Ok(fetched) => fetched,
            Err(e) => return failed(Stage::Fetch, e.to_string()),
        };
        debug!(extension = %extension_id, file, bytes = source_code.len(), "widget source fetched");

        let evaluator = self.evaluator.clone();
        let evaluated =
            tokio::task::spawn_blocking(move || evaluator.try_evaluate(&source_code)).await;
        let component: Arc<dyn WidgetComponent> = match evaluated {
            Ok(Ok(widget)) => Arc::new(widget),
            Ok(Err(e)) => return failed(Stage::Evaluate, e.to_string()),
            Err(e) => return failed(Stage::Evaluate, format!("evaluation task failed: {e}")),
        };

        registration.source = WidgetSource::Extension;
        registration.extension_id = Some(extension_id.to_string());
        let name = registration.name.clone();
        let wrapped: Arc<dyn WidgetComponent> =
            Arc::new(SandboxedWidget::named(component, name.clone()));
        debug!(extension = %extension_id, widget = %name, "widget wrapped");

        match self
            .registry
            .register_widget(WidgetRegistration::new(registration, wrapped))
        {
            Ok(_) => {
                info!(extension = %extension_id, widget = %name, "extension widget registered");
                FileOutcome::registered(extension_id, file, name)
            }
            Err(e) => failed(Stage::Register, e.to_string()),
        }
    }
}

impl std::fmt::Debug for DiscoveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryService")
            .field("widgets", &self.registry.len())
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}
