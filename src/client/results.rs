// src/client/results.rs

//! Typed, serializable operation results
//!
//! Per-component failures land in the record's `error` field; the enclosing
//! operation keeps iterating. Non-fatal mishaps after a successful download
//! (symlink update, retention) are recorded as warnings and never fail the
//! component.

use serde::Serialize;

/// One row of `check-new` output
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub component: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub current_version: String,
    pub newest_version: String,
    pub update_available: bool,
}

/// One row of `update` output
#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateResult {
    pub component: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub downloaded: bool,
    pub installed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

impl UpdateResult {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    /// Whether this component failed
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// One row of `list` output
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub component: String,
    pub version: String,
    pub available: bool,
    pub installed: bool,
    pub current: bool,
    pub protected: bool,
}

/// One row of `vacuum` output
#[derive(Debug, Clone, Serialize, Default)]
pub struct VacuumResult {
    pub component: String,
    pub removed: Vec<String>,
    pub kept: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One row of `pending` output
#[derive(Debug, Clone, Serialize, Default)]
pub struct PendingResult {
    pub component: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub installed_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub active_version: String,
    pub pending: bool,
}

/// Result of `remove`
#[derive(Debug, Clone, Serialize, Default)]
pub struct RemoveResult {
    pub component: String,
    pub removed_files: Vec<String>,
    pub removed_symlink: bool,
    pub unmerged: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

/// Result of `install`
#[derive(Debug, Clone, Serialize, Default)]
pub struct InstallResult {
    pub component: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transfer_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

/// One row of `features list` output
#[derive(Debug, Clone, Serialize)]
pub struct FeatureInfo {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub masked: bool,
    pub source: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transfers: Vec<String>,
}

/// Result of a feature enable/disable action
#[derive(Debug, Clone, Serialize, Default)]
pub struct FeatureActionResult {
    pub feature: String,
    pub action: String,
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub drop_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub downloaded_files: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unmerged: bool,
}

/// One remote extension found by `discover`
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionInfo {
    pub name: String,
    pub versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `discover`
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverResult {
    pub url: String,
    pub extensions: Vec<ExtensionInfo>,
}

/// One row of `components` output
#[derive(Debug, Clone, Serialize)]
pub struct ComponentInfo {
    pub name: String,
    pub source: String,
    pub source_type: String,
    pub target_path: String,
    pub instances_max: usize,
}
