// src/client/options.rs

//! Typed options for client operations

/// Options for [`Client::list`](super::Client::list)
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Restrict to one component
    pub component: Option<String>,
    /// Restrict to one version
    pub version: Option<String>,
}

/// Options for [`Client::check_new`](super::Client::check_new)
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub component: Option<String>,
}

/// Options for [`Client::update`](super::Client::update)
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Restrict to one component
    pub component: Option<String>,
    /// Install this exact version instead of the newest
    pub version: Option<String>,
    /// Skip retention after a successful download
    pub no_vacuum: bool,
    /// Skip the activation refresh at the end of the batch
    pub no_refresh: bool,
}

/// Options for [`Client::install`](super::Client::install)
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Extension to install; required
    pub component: String,
    pub no_refresh: bool,
}

/// Options for [`Client::vacuum`](super::Client::vacuum)
#[derive(Debug, Clone, Default)]
pub struct VacuumOptions {
    pub component: Option<String>,
}

/// Options for [`Client::pending`](super::Client::pending)
#[derive(Debug, Clone, Default)]
pub struct PendingOptions {
    pub component: Option<String>,
}

/// Options for [`Client::remove`](super::Client::remove)
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Unmerge immediately before removing files
    pub now: bool,
    pub no_refresh: bool,
}

/// Options for [`Client::enable_feature`](super::Client::enable_feature)
#[derive(Debug, Clone, Default)]
pub struct EnableFeatureOptions {
    /// Download the feature's extensions immediately
    pub now: bool,
    /// Record intended actions without touching the filesystem
    pub dry_run: bool,
    /// Retry network operations on failure
    pub retry: bool,
    /// Attempts when `retry` is set; 0 means the default of 3
    pub retry_count: u32,
    pub no_refresh: bool,
}

/// Options for [`Client::disable_feature`](super::Client::disable_feature)
#[derive(Debug, Clone, Default)]
pub struct DisableFeatureOptions {
    /// Deprecated alias for `now`
    pub remove: bool,
    /// Remove files and unmerge immediately
    pub now: bool,
    /// Proceed even when an extension is currently active
    pub force: bool,
    pub dry_run: bool,
    pub no_refresh: bool,
}
