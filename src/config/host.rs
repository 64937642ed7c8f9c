// src/config/host.rs

//! Host identity for specifier expansion
//!
//! `ProtectVersion=` values may reference the running host through `%`
//! specifiers resolved from the OS identity file. The lookup is behind the
//! [`HostIdentity`] trait so tests can substitute a fixed map.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Supplies os-release style key/value pairs for the running host
pub trait HostIdentity: Send + Sync {
    fn os_release(&self) -> HashMap<String, String>;
}

/// Default identity: reads `/etc/os-release`, falling back to
/// `/usr/lib/os-release`.
pub struct OsReleaseIdentity {
    paths: Vec<PathBuf>,
}

impl OsReleaseIdentity {
    pub fn new() -> Self {
        Self {
            paths: vec![
                PathBuf::from("/etc/os-release"),
                PathBuf::from("/usr/lib/os-release"),
            ],
        }
    }

    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Default for OsReleaseIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIdentity for OsReleaseIdentity {
    fn os_release(&self) -> HashMap<String, String> {
        for path in &self.paths {
            let Ok(data) = fs::read_to_string(path) else {
                continue;
            };
            return parse_os_release(&data);
        }
        HashMap::new()
    }
}

/// Fixed identity map, for tests
pub struct StaticIdentity(pub HashMap<String, String>);

impl HostIdentity for StaticIdentity {
    fn os_release(&self) -> HashMap<String, String> {
        self.0.clone()
    }
}

fn parse_os_release(data: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        result.insert(key.to_string(), value.to_string());
    }
    result
}

/// Expand `%` specifiers using the host identity.
///
/// Recognized: `%A` image version, `%a` architecture, `%B` build id, `%M`
/// image id, `%m`/`%o` id, `%v` version id, `%w` variant id, `%%` literal
/// percent. A recognized specifier with no value expands to the empty string;
/// unrecognized sequences pass through unchanged.
pub fn expand_specifiers(s: &str, host: &dyn HostIdentity) -> String {
    let release = host.os_release();
    let lookup = |key: &str| release.get(key).cloned().unwrap_or_default();

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('A') => result.push_str(&lookup("IMAGE_VERSION")),
            Some('a') => result.push_str(&lookup("ARCHITECTURE")),
            Some('B') => result.push_str(&lookup("BUILD_ID")),
            Some('M') => result.push_str(&lookup("IMAGE_ID")),
            Some('m') | Some('o') => result.push_str(&lookup("ID")),
            Some('v') => result.push_str(&lookup("VERSION_ID")),
            Some('w') => result.push_str(&lookup("VARIANT_ID")),
            Some('%') => result.push('%'),
            Some(other) => {
                result.push('%');
                result.push(other);
            }
            None => result.push('%'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(pairs: &[(&str, &str)]) -> StaticIdentity {
        StaticIdentity(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_expand_known_specifiers() {
        let host = identity(&[("IMAGE_VERSION", "42"), ("ID", "acme-os")]);
        assert_eq!(expand_specifiers("img-%A-%m", &host), "img-42-acme-os");
    }

    #[test]
    fn test_expand_missing_value_is_empty() {
        let host = identity(&[]);
        assert_eq!(expand_specifiers("pre%Apost", &host), "prepost");
    }

    #[test]
    fn test_expand_literal_percent() {
        let host = identity(&[]);
        assert_eq!(expand_specifiers("100%%", &host), "100%");
    }

    #[test]
    fn test_expand_unknown_specifier_passes_through() {
        let host = identity(&[]);
        assert_eq!(expand_specifiers("%z", &host), "%z");
    }

    #[test]
    fn test_parse_os_release_quotes() {
        let parsed = parse_os_release("ID=debian\nVERSION_ID=\"13\"\n# comment\nBAD LINE\n");
        assert_eq!(parsed["ID"], "debian");
        assert_eq!(parsed["VERSION_ID"], "13");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_os_release_identity_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("etc-os-release");
        let fallback = dir.path().join("usr-lib-os-release");
        fs::write(&fallback, "ID=fallback-os\n").unwrap();

        let host = OsReleaseIdentity::with_paths(vec![primary, fallback]);
        assert_eq!(host.os_release()["ID"], "fallback-os");
    }
}
