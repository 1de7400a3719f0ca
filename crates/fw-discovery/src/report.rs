//! Outcome records for a discovery pass

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Per-file pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Fetching source from the extension index
    Fetch,
    /// Validating and loading the module in the sandbox
    Evaluate,
    /// Inserting into the registry
    Register,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetch => "fetch",
            Self::Evaluate => "evaluate",
            Self::Register => "register",
        };
        f.write_str(s)
    }
}

/// Final state of one widget file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    /// Widget is in the registry under `widget`
    Registered {
        /// Registered widget name
        widget: String,
    },
    /// Pipeline stopped at `stage`
    Failed {
        /// Stage that failed
        stage: Stage,
        /// Failure description
        reason: String,
    },
}

/// Outcome for one widget file of one extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    /// Extension the file belongs to
    pub extension_id: String,
    /// Widget file name
    pub file: String,
    /// Where the pipeline ended
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub(crate) fn registered(extension_id: &str, file: &str, widget: String) -> Self {
        Self {
            extension_id: extension_id.to_string(),
            file: file.to_string(),
            status: FileStatus::Registered { widget },
        }
    }

    pub(crate) fn failed(extension_id: &str, file: &str, stage: Stage, reason: String) -> Self {
        Self {
            extension_id: extension_id.to_string(),
            file: file.to_string(),
            status: FileStatus::Failed { stage, reason },
        }
    }

    /// Whether the widget made it into the registry
    #[must_use]
    pub fn is_registered(&self) -> bool {
        matches!(self.status, FileStatus::Registered { .. })
    }
}

/// Extension whose file list could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionFailure {
    /// Extension id
    pub extension_id: String,
    /// Failure description
    pub reason: String,
}

/// Summary of a full or per-extension load
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// When the pass finished
    pub finished_at: DateTime<Utc>,
    /// Extension widgets removed before loading
    pub cleared: usize,
    /// One entry per listed widget file
    pub outcomes: Vec<FileOutcome>,
    /// Extensions skipped because their file list failed
    pub failed_extensions: Vec<ExtensionFailure>,
}

impl DiscoveryReport {
    pub(crate) fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            cleared: 0,
            outcomes: Vec::new(),
            failed_extensions: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Names of widgets that were registered
    #[must_use]
    pub fn registered(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                FileStatus::Registered { widget } => Some(widget.as_str()),
                FileStatus::Failed { .. } => None,
            })
            .collect()
    }

    /// Outcomes that did not end in registration
    #[must_use]
    pub fn failed(&self) -> Vec<&FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_registered()).collect()
    }

    /// Whether every extension and file loaded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_extensions.is_empty() && self.outcomes.iter().all(FileOutcome::is_registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_helpers_split_outcomes() {
        let mut report = DiscoveryReport::begin();
        report
            .outcomes
            .push(FileOutcome::registered("a", "x.js", "x".into()));
        report.outcomes.push(FileOutcome::failed(
            "a",
            "y.js",
            Stage::Evaluate,
            "denied".into(),
        ));

        assert_eq!(report.registered(), vec!["x"]);
        assert_eq!(report.failed().len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = FileOutcome::failed("a", "y.js", Stage::Fetch, "HTTP 500".into());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "extensionId": "a",
                "file": "y.js",
                "status": "failed",
                "stage": "fetch",
                "reason": "HTTP 500"
            })
        );
    }

    #[test]
    fn stages_follow_pipeline_order() {
        let stages = [Stage::Fetch, Stage::Evaluate, Stage::Register];
        let shown: Vec<String> = stages.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["fetch", "evaluate", "register"]);
        assert_eq!(
            serde_json::to_value(stages).unwrap(),
            json!(["fetch", "evaluate", "register"])
        );
    }
}
