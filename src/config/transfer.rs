// src/config/transfer.rs

//! Transfer definitions (`*.transfer`)
//!
//! A transfer declares one managed component: where versioned artifacts come
//! from, where they are staged, how many to retain, and which features gate
//! it. Records are immutable once loaded; the loader re-reads the filesystem
//! on every operation.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};
use crate::version::Pattern;

use super::host::{expand_specifiers, HostIdentity};
use super::ini::{parse_bool, Document};
use super::{collect_config_files, collect_dropins, search_paths, Feature, DEFAULT_TARGET_PATH};

/// `[Transfer]` section
#[derive(Debug, Clone)]
pub struct TransferSection {
    /// Lower bound (inclusive) on candidate versions
    pub min_version: String,
    /// Version retention must never remove; specifier-expanded at load
    pub protect_version: String,
    /// Require manifest signature verification for this transfer
    pub verify: bool,
    /// Number of versions to keep on disk
    pub instances_max: usize,
    /// Feature membership; any enabled member activates the transfer
    pub features: Vec<String>,
    /// Features that must all be enabled for the transfer to be active
    pub requisite_features: Vec<String>,
}

/// `[Source]` section
#[derive(Debug, Clone)]
pub struct SourceSection {
    /// Source type; only `url-file` is supported
    pub source_type: String,
    /// Base URL, trailing slash stripped
    pub path: String,
    /// Filename templates, first is primary
    pub match_patterns: Vec<String>,
}

/// `[Target]` section
#[derive(Debug, Clone)]
pub struct TargetSection {
    pub target_type: String,
    /// Staging directory
    pub path: PathBuf,
    /// Filename templates, first is used to build the staged filename
    pub match_patterns: Vec<String>,
    /// Name of the symlink pointing at the selected version, if any
    pub current_symlink: String,
    /// File mode for staged artifacts
    pub mode: u32,
    pub read_only: bool,
}

/// A parsed transfer definition, immutable once loaded
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Component identity, the stem of the definition file
    pub component: String,
    /// Provenance of the base definition
    pub file_path: PathBuf,
    pub transfer: TransferSection,
    pub source: SourceSection,
    pub target: TargetSection,
}

/// Load every transfer definition visible through the search paths (or the
/// caller-supplied override directory), drop-ins applied, sorted by
/// component for deterministic iteration.
pub fn load_transfers(custom: Option<&Path>, host: &dyn HostIdentity) -> Result<Vec<Transfer>> {
    let paths = search_paths(custom);
    let files = collect_config_files(&paths, ".transfer")?;

    let mut transfers = Vec::with_capacity(files.len());
    for (component, file_path) in files {
        let mut transfer = Transfer {
            component: component.clone(),
            file_path: file_path.clone(),
            transfer: TransferSection {
                min_version: String::new(),
                protect_version: String::new(),
                verify: false,
                instances_max: 2,
                features: Vec::new(),
                requisite_features: Vec::new(),
            },
            source: SourceSection {
                source_type: String::new(),
                path: String::new(),
                match_patterns: Vec::new(),
            },
            target: TargetSection {
                target_type: String::new(),
                path: PathBuf::from(DEFAULT_TARGET_PATH),
                match_patterns: Vec::new(),
                current_symlink: String::new(),
                mode: 0o644,
                read_only: false,
            },
        };

        apply_file(&mut transfer, &file_path, host)?;

        let dropin_dir = format!("{component}.transfer.d");
        for dropin in collect_dropins(&paths, &dropin_dir)? {
            apply_file(&mut transfer, &dropin, host)?;
        }

        validate(&transfer)?;
        transfers.push(transfer);
    }

    Ok(transfers)
}

fn apply_file(t: &mut Transfer, path: &Path, host: &dyn HostIdentity) -> Result<()> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::System(format!("failed to read {origin}: {e}")))?;
    let doc = Document::parse(&content, &origin)?;
    apply_document(t, &doc, &origin, host)
}

/// Apply a parsed document onto the typed record, key by key. Later
/// applications (drop-ins) override earlier values.
fn apply_document(
    t: &mut Transfer,
    doc: &Document,
    origin: &str,
    host: &dyn HostIdentity,
) -> Result<()> {
    for section in &doc.sections {
        match section.name.as_str() {
            "Transfer" => {
                for (key, value) in &section.entries {
                    match key.as_str() {
                        "MinVersion" => t.transfer.min_version = value.clone(),
                        "ProtectVersion" => {
                            t.transfer.protect_version = expand_specifiers(value, host)
                        }
                        "Verify" => {
                            t.transfer.verify = parse_bool(value).ok_or_else(|| {
                                Error::Config(format!("{origin}: Transfer.Verify: invalid boolean '{value}'"))
                            })?
                        }
                        "InstancesMax" => {
                            t.transfer.instances_max = value.parse().map_err(|_| {
                                Error::Config(format!(
                                    "{origin}: Transfer.InstancesMax: invalid integer '{value}'"
                                ))
                            })?
                        }
                        "Features" => {
                            t.transfer.features =
                                value.split_whitespace().map(str::to_string).collect()
                        }
                        "RequisiteFeatures" => {
                            t.transfer.requisite_features =
                                value.split_whitespace().map(str::to_string).collect()
                        }
                        other => warn!("{origin}: ignoring unknown key Transfer.{other}"),
                    }
                }
            }
            "Source" => {
                for (key, value) in &section.entries {
                    match key.as_str() {
                        "Type" => t.source.source_type = value.clone(),
                        "Path" => t.source.path = value.trim_end_matches('/').to_string(),
                        "MatchPattern" => {
                            t.source.match_patterns =
                                value.split_whitespace().map(str::to_string).collect()
                        }
                        other => warn!("{origin}: ignoring unknown key Source.{other}"),
                    }
                }
            }
            "Target" => {
                for (key, value) in &section.entries {
                    match key.as_str() {
                        "Type" => t.target.target_type = value.clone(),
                        "Path" => t.target.path = PathBuf::from(value),
                        "MatchPattern" => {
                            t.target.match_patterns =
                                value.split_whitespace().map(str::to_string).collect()
                        }
                        "CurrentSymlink" => t.target.current_symlink = value.clone(),
                        "Mode" => {
                            t.target.mode = u32::from_str_radix(value, 8).map_err(|_| {
                                Error::Config(format!(
                                    "{origin}: Target.Mode: invalid octal mode '{value}'"
                                ))
                            })?
                        }
                        "ReadOnly" => {
                            t.target.read_only = parse_bool(value).ok_or_else(|| {
                                Error::Config(format!("{origin}: Target.ReadOnly: invalid boolean '{value}'"))
                            })?
                        }
                        other => warn!("{origin}: ignoring unknown key Target.{other}"),
                    }
                }
            }
            other => {
                return Err(Error::Config(format!(
                    "{origin}: unknown section [{other}]"
                )))
            }
        }
    }
    Ok(())
}

fn validate(t: &Transfer) -> Result<()> {
    let origin = t.file_path.display();

    if t.source.source_type.is_empty() {
        return Err(Error::Config(format!("{origin}: Source.Type is required")));
    }
    if t.source.path.is_empty() {
        return Err(Error::Config(format!("{origin}: Source.Path is required")));
    }
    if t.source.match_patterns.is_empty() {
        return Err(Error::Config(format!(
            "{origin}: Source.MatchPattern is required"
        )));
    }
    if t.target.match_patterns.is_empty() {
        return Err(Error::Config(format!(
            "{origin}: Target.MatchPattern is required"
        )));
    }
    if t.transfer.instances_max < 1 {
        return Err(Error::Config(format!(
            "{origin}: Transfer.InstancesMax must be at least 1"
        )));
    }

    for pattern in t.source.match_patterns.iter().chain(&t.target.match_patterns) {
        Pattern::parse(pattern)
            .map_err(|e| Error::Config(format!("{origin}: {e}")))?;
    }

    Ok(())
}

/// Filter transfers by enabled features.
///
/// A transfer is active iff it is unconditional (no feature lists), or its
/// `Features` list has at least one enabled member (OR) and its
/// `RequisiteFeatures` list has every member enabled (AND). When no features
/// are defined at all, every transfer is active.
pub fn filter_transfers_by_features(transfers: Vec<Transfer>, features: &[Feature]) -> Vec<Transfer> {
    if features.is_empty() {
        return transfers;
    }
    transfers
        .into_iter()
        .filter(|t| is_transfer_enabled(t, features))
        .collect()
}

fn is_transfer_enabled(t: &Transfer, features: &[Feature]) -> bool {
    if t.transfer.features.is_empty() && t.transfer.requisite_features.is_empty() {
        return true;
    }

    if !t.transfer.features.is_empty()
        && !t
            .transfer
            .features
            .iter()
            .any(|name| super::is_feature_enabled(features, name))
    {
        return false;
    }

    t.transfer
        .requisite_features
        .iter()
        .all(|name| super::is_feature_enabled(features, name))
}

/// All transfers that mention `feature_name` in either feature list, without
/// duplicates, preserving input order.
pub fn get_transfers_for_feature<'a>(
    transfers: &'a [Transfer],
    feature_name: &str,
) -> Vec<&'a Transfer> {
    transfers
        .iter()
        .filter(|t| {
            t.transfer.features.iter().any(|f| f == feature_name)
                || t.transfer.requisite_features.iter().any(|f| f == feature_name)
        })
        .collect()
}
