// src/version/mod.rs

//! Version ordering and filename pattern matching
//!
//! Version strings in extension repositories come in several shapes: semantic
//! (`1.2.3`, `1.0.0-rc1`), date-based (`20240115`), and packaging-system
//! formats with epochs and tildes (`5:29.1.5-1~debian.13~trixie`). Ordering is
//! resolved at parse time into a sum type: strings that read as generalized
//! semantic versions compare numerically segment by segment, everything else
//! falls back to byte-lexicographic comparison over the original string.

use std::cmp::Ordering;
use std::fmt;

mod pattern;

pub use pattern::{extract_version_multi, Pattern};

/// A version string, classified once at parse time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// Dot-separated numeric segments with an optional pre-release suffix
    Semantic {
        raw: String,
        parts: Vec<u64>,
        pre: Option<String>,
    },
    /// Anything else; compared byte-lexicographically on the raw string
    Opaque { raw: String },
}

impl Version {
    /// Parse a version string, stripping a single leading `v`/`V`.
    ///
    /// Never fails: strings that do not read as semantic versions are kept as
    /// [`Version::Opaque`] and ordered lexicographically.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.strip_prefix('v').or_else(|| s.strip_prefix('V')).unwrap_or(s);

        if let Some((parts, pre)) = parse_semantic(trimmed) {
            return Version::Semantic {
                raw: s.to_string(),
                parts,
                pre,
            };
        }

        Version::Opaque { raw: s.to_string() }
    }

    /// The original string as read from the filename
    pub fn raw(&self) -> &str {
        match self {
            Version::Semantic { raw, .. } => raw,
            Version::Opaque { raw } => raw,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// Interpret a string as a generalized semantic version.
///
/// Strict three-segment versions go through the `semver` parser (which also
/// handles dotted pre-release identifiers and build metadata); shorter or
/// longer all-numeric forms such as `1.0` or `20240115` are accepted by a
/// lenient segment parse. Returns `None` for everything else, which routes
/// the string to the opaque fallback.
fn parse_semantic(s: &str) -> Option<(Vec<u64>, Option<String>)> {
    if s.is_empty() {
        return None;
    }

    if let Ok(v) = semver::Version::parse(s) {
        let pre = (!v.pre.is_empty()).then(|| v.pre.as_str().to_string());
        return Some((vec![v.major, v.minor, v.patch], pre));
    }

    let (base, pre) = match s.split_once('-') {
        Some((b, p)) => (b, Some(p.to_string())),
        None => (s, None),
    };

    let mut parts = Vec::new();
    for segment in base.split('.') {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parts.push(segment.parse::<u64>().ok()?);
    }

    Some((parts, pre))
}

/// Compare two version strings under the total order described above.
///
/// Both semantic: numeric segments compare position by position (missing
/// segments count as zero), then pre-release, where a release outranks any
/// pre-release of the same base. Otherwise: byte comparison of the originals.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (
            Version::Semantic { parts: pa, pre: ra, .. },
            Version::Semantic { parts: pb, pre: rb, .. },
        ) => {
            let len = pa.len().max(pb.len());
            for i in 0..len {
                let x = pa.get(i).copied().unwrap_or(0);
                let y = pb.get(i).copied().unwrap_or(0);
                match x.cmp(&y) {
                    Ordering::Equal => {}
                    ord => return ord,
                }
            }
            match (ra, rb) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => x.cmp(&y),
            }
        }
        _ => a.cmp(b),
    }
}

/// Sort version strings in descending order (newest first)
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare(b, a));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_semantic_order() {
        assert_eq!(compare("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare("1.0.1", "1.1.0"), Ordering::Less);
        assert_eq!(compare("1.1.0", "2.0.0"), Ordering::Less);
        assert_eq!(compare("2.0.0", "1.1.0"), Ordering::Greater);
        assert_eq!(compare("1.2.3", "1.2.3"), Ordering::Equal);
    }

    #[test]
    fn test_compare_prerelease_precedes_release() {
        assert_eq!(compare("1.0.0-rc1", "1.0.0"), Ordering::Less);
        assert_eq!(compare("1.0.0", "1.0.0-rc1"), Ordering::Greater);
        assert_eq!(compare("1.0.0-rc1", "1.0.0-rc2"), Ordering::Less);
    }

    #[test]
    fn test_compare_strips_leading_v() {
        assert_eq!(compare("v1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare("V2.1.0", "2.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_date_versions_numeric() {
        assert_eq!(compare("20240101", "20240115"), Ordering::Less);
        assert_eq!(compare("20241201", "20240115"), Ordering::Greater);
    }

    #[test]
    fn test_compare_uneven_segment_counts() {
        assert_eq!(compare("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_compare_opaque_falls_back_to_lexicographic() {
        // Epoch/tilde versions do not parse; byte order decides
        assert_eq!(
            compare("5:29.1.5-1~debian.13~trixie", "5:29.1.6-1~debian.13~trixie"),
            Ordering::Less
        );
        assert_eq!(compare("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn test_parse_classification() {
        assert!(matches!(Version::parse("1.2.3"), Version::Semantic { .. }));
        assert!(matches!(Version::parse("20240101"), Version::Semantic { .. }));
        assert!(matches!(Version::parse("v1.0.0-rc1"), Version::Semantic { .. }));
        assert!(matches!(Version::parse("5:29.1.5"), Version::Opaque { .. }));
        assert!(matches!(Version::parse(""), Version::Opaque { .. }));
    }

    #[test]
    fn test_sort_descending_newest_first() {
        let mut versions = vec![
            "1.0.0".to_string(),
            "2.0.0".to_string(),
            "1.5.0".to_string(),
        ];
        sort_descending(&mut versions);
        assert_eq!(versions, vec!["2.0.0", "1.5.0", "1.0.0"]);
    }

    #[test]
    fn test_sort_is_permutation() {
        let versions = vec![
            "1.0.0-rc1".to_string(),
            "1.0.0".to_string(),
            "20240101".to_string(),
            "0.9.9".to_string(),
        ];
        let mut sorted = versions.clone();
        sort_descending(&mut sorted);

        let mut a = versions.clone();
        let mut b = sorted.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);

        for pair in sorted.windows(2) {
            assert_ne!(compare(&pair[0], &pair[1]), Ordering::Less);
        }
    }
}
