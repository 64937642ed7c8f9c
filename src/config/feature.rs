// src/config/feature.rs

//! Feature definitions (`*.feature`)
//!
//! Features group transfers behind an enable/disable switch. A feature file
//! that is a symlink to the null device is masked: permanently disabled and
//! immune to enable/disable.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};

use super::ini::{parse_bool, Document};
use super::{collect_config_files, collect_dropins, search_paths};

/// A parsed feature definition
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature name, the stem of the definition file
    pub name: String,
    pub file_path: PathBuf,
    pub description: String,
    /// URL to documentation
    pub documentation: String,
    /// URL to an AppStream catalog
    pub app_stream: String,
    pub enabled: bool,
    /// True iff the definition file is a symlink to the null device
    pub masked: bool,
}

/// Load every feature definition visible through the search paths, drop-ins
/// applied, sorted by name.
pub fn load_features(custom: Option<&Path>) -> Result<Vec<Feature>> {
    let paths = search_paths(custom);
    let files = collect_config_files(&paths, ".feature")?;

    let mut features = Vec::with_capacity(files.len());
    for (name, file_path) in files {
        let mut feature = Feature {
            name: name.clone(),
            file_path: file_path.clone(),
            description: String::new(),
            documentation: String::new(),
            app_stream: String::new(),
            enabled: false,
            masked: false,
        };

        if is_masked(&file_path) {
            feature.masked = true;
            features.push(feature);
            continue;
        }

        apply_file(&mut feature, &file_path)?;

        let dropin_dir = format!("{name}.feature.d");
        for dropin in collect_dropins(&paths, &dropin_dir)? {
            apply_file(&mut feature, &dropin)?;
        }

        features.push(feature);
    }

    Ok(features)
}

fn is_masked(path: &Path) -> bool {
    match std::fs::read_link(path) {
        Ok(target) => target == Path::new("/dev/null"),
        Err(_) => false,
    }
}

fn apply_file(f: &mut Feature, path: &Path) -> Result<()> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::System(format!("failed to read {origin}: {e}")))?;
    let doc = Document::parse(&content, &origin)?;

    for section in &doc.sections {
        match section.name.as_str() {
            "Feature" => {
                for (key, value) in &section.entries {
                    match key.as_str() {
                        "Description" => f.description = value.clone(),
                        "Documentation" => f.documentation = value.clone(),
                        "AppStream" => f.app_stream = value.clone(),
                        "Enabled" => {
                            f.enabled = parse_bool(value).ok_or_else(|| {
                                Error::Config(format!(
                                    "{origin}: Feature.Enabled: invalid boolean '{value}'"
                                ))
                            })?
                        }
                        other => warn!("{origin}: ignoring unknown key Feature.{other}"),
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

/// Names of the features that are enabled and not masked
pub fn enabled_feature_names(features: &[Feature]) -> Vec<String> {
    features
        .iter()
        .filter(|f| f.enabled && !f.masked)
        .map(|f| f.name.clone())
        .collect()
}

/// Whether the named feature exists, is enabled, and is not masked
pub fn is_feature_enabled(features: &[Feature], name: &str) -> bool {
    features
        .iter()
        .find(|f| f.name == name)
        .is_some_and(|f| f.enabled && !f.masked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_feature(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(format!("{name}.feature")), body).unwrap();
    }

    #[test]
    fn test_load_feature_defaults_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write_feature(dir.path(), "devel", "[Feature]\nDescription=Development tools\n");

        let features = load_features(Some(dir.path())).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "devel");
        assert_eq!(features[0].description, "Development tools");
        assert!(!features[0].enabled);
        assert!(!features[0].masked);
    }

    #[test]
    fn test_load_feature_enabled() {
        let dir = tempfile::tempdir().unwrap();
        write_feature(dir.path(), "devel", "[Feature]\nEnabled=true\n");
        let features = load_features(Some(dir.path())).unwrap();
        assert!(features[0].enabled);
    }

    #[test]
    fn test_load_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_feature(dir.path(), "zeta", "[Feature]\n");
        write_feature(dir.path(), "alpha", "[Feature]\n");
        let features = load_features(Some(dir.path())).unwrap();
        let names: Vec<_> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_masked_feature() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/dev/null", dir.path().join("hidden.feature")).unwrap();

        let features = load_features(Some(dir.path())).unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].masked);
        assert!(!features[0].enabled);
    }

    #[test]
    fn test_dropin_overrides_enabled() {
        let dir = tempfile::tempdir().unwrap();
        write_feature(dir.path(), "devel", "[Feature]\nEnabled=false\n");
        let dropin_dir = dir.path().join("devel.feature.d");
        fs::create_dir(&dropin_dir).unwrap();
        fs::write(dropin_dir.join("00-enable.conf"), "[Feature]\nEnabled=true\n").unwrap();

        let features = load_features(Some(dir.path())).unwrap();
        assert!(features[0].enabled);
    }

    #[test]
    fn test_later_dropin_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_feature(dir.path(), "devel", "[Feature]\n");
        let dropin_dir = dir.path().join("devel.feature.d");
        fs::create_dir(&dropin_dir).unwrap();
        fs::write(dropin_dir.join("00-on.conf"), "[Feature]\nEnabled=true\n").unwrap();
        fs::write(dropin_dir.join("10-off.conf"), "[Feature]\nEnabled=false\n").unwrap();

        let features = load_features(Some(dir.path())).unwrap();
        assert!(!features[0].enabled);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_feature(dir.path(), "bad", "[Mystery]\nKey=1\n");
        assert!(load_features(Some(dir.path())).is_err());
    }

    #[test]
    fn test_enabled_feature_names_skips_masked() {
        let features = vec![
            Feature {
                name: "a".into(),
                file_path: PathBuf::new(),
                description: String::new(),
                documentation: String::new(),
                app_stream: String::new(),
                enabled: true,
                masked: false,
            },
            Feature {
                name: "b".into(),
                file_path: PathBuf::new(),
                description: String::new(),
                documentation: String::new(),
                app_stream: String::new(),
                enabled: true,
                masked: true,
            },
        ];
        assert_eq!(enabled_feature_names(&features), vec!["a"]);
        assert!(is_feature_enabled(&features, "a"));
        assert!(!is_feature_enabled(&features, "b"));
        assert!(!is_feature_enabled(&features, "missing"));
    }
}
