// src/config/ini.rs

//! Sectioned key=value parser for definition files and drop-ins.
//!
//! Transfer and feature files use the systemd unit-file dialect: `[Section]`
//! headers, `Key=Value` lines, `#`/`;` comments. Parsing keeps sections in
//! file order so overlays apply deterministically; interpretation into typed
//! records happens in the transfer/feature loaders.

use crate::error::{Error, Result};

/// One `[Section]` with its key/value lines in file order
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

/// A parsed definition file or drop-in
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// Parse INI content. `origin` names the file in error messages.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let mut sections: Vec<Section> = Vec::new();

        for (lineno, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(name) = header.strip_suffix(']') else {
                    return Err(Error::Config(format!(
                        "{origin}:{}: malformed section header '{line}'",
                        lineno + 1
                    )));
                };
                sections.push(Section {
                    name: name.trim().to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::Config(format!(
                    "{origin}:{}: expected 'Key=Value', got '{line}'",
                    lineno + 1
                )));
            };

            let Some(section) = sections.last_mut() else {
                return Err(Error::Config(format!(
                    "{origin}:{}: assignment outside of any section",
                    lineno + 1
                )));
            };

            section
                .entries
                .push((key.trim().to_string(), value.trim().to_string()));
        }

        Ok(Self { sections })
    }
}

/// Interpret a systemd-style boolean
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
