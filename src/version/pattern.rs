// src/version/pattern.rs

//! Filename match patterns with `@`-placeholders.
//!
//! A pattern like `myext_@v_@a.raw` compiles to an anchored regular
//! expression. Only `@v` is captured; every other placeholder matches its
//! character class and is discarded. The whole filename must match.

use regex::Regex;

use crate::error::{Error, Result};

/// Recognized placeholders and their character classes. `@v` is required and
/// is the single capture group.
const PLACEHOLDERS: &[(&str, &str)] = &[
    ("@v", "([A-Za-z0-9._+:~-]+)"), // version (captured)
    ("@u", "[a-fA-F0-9-]+"),        // uuid
    ("@f", "[0-9]+"),               // flags
    ("@a", "[a-zA-Z0-9_]*"),        // architecture, may be empty
    ("@g", "[01]"),                 // grow-filesystem bit
    ("@r", "[01]"),                 // read-only bit
    ("@t", "[0-9]+"),               // modification time
    ("@m", "[0-7]+"),               // file mode
    ("@s", "[0-9]+"),               // file size
    ("@d", "[0-9]+"),               // tries done
    ("@l", "[0-9]+"),               // tries left
    ("@h", "[0-9a-f]+"),            // sha256 digest
];

/// A compiled match pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern string. Fails if the pattern is empty or lacks `@v`.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::Config("match pattern cannot be empty".to_string()));
        }
        if !pattern.contains("@v") {
            return Err(Error::Config(format!(
                "match pattern '{pattern}' must contain the @v placeholder"
            )));
        }

        let mut regex_str = regex::escape(pattern);
        for (placeholder, class) in PLACEHOLDERS {
            regex_str = regex_str.replace(&regex::escape(placeholder), class);
        }

        let anchored = format!("^{regex_str}$");
        let regex = Regex::new(&anchored).map_err(|e| {
            Error::Config(format!("match pattern '{pattern}' did not compile: {e}"))
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    /// Extract the version from a filename, or `None` if it does not match
    pub fn extract_version(&self, filename: &str) -> Option<String> {
        self.regex
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Whether a filename matches the pattern
    pub fn matches(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }

    /// Substitute `@v` with the given version and elide all other placeholders
    pub fn build_filename(&self, version: &str) -> String {
        let mut result = self.raw.replace("@v", version);
        for (placeholder, _) in PLACEHOLDERS {
            if *placeholder != "@v" {
                result = result.replace(placeholder, "");
            }
        }
        result
    }

    /// The original pattern string
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Try each pattern in order and return the first extracted version together
/// with the pattern that matched.
pub fn extract_version_multi(filename: &str, patterns: &[String]) -> Option<(String, String)> {
    for pattern_str in patterns {
        let Ok(pattern) = Pattern::parse(pattern_str) else {
            continue;
        };
        if let Some(v) = pattern.extract_version(filename) {
            return Some((v, pattern_str.clone()));
        }
    }
    None
}
