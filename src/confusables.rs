//! Confusable character table
//!
//! Maps a lowercase Latin letter to the characters from other scripts that
//! render like it. The table is loaded once from a JSON resource of the form
//!
//! ```json
//! [{"latin": "a", "similar": [{"CYRILLIC": {"а": "CYRILLIC SMALL LETTER A"}}]}]
//! ```
//!
//! and is read-only afterwards. Callers pass it by reference to the analysis.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Embedded default character set, used when no table path is configured
pub const DEFAULT_TABLE: &str = include_str!("../config/unicode_combinations.json");

#[derive(Error, Debug)]
pub enum ConfusableTableError {
    #[error("Confusable table not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read confusable table: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse confusable table: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Malformed confusable entry #{index}: {reason}")]
    MalformedEntry { index: usize, reason: String },
}

/// Raw on-disk shape of one table entry
#[derive(Debug, Deserialize)]
struct RawEntry {
    latin: String,
    similar: Vec<BTreeMap<String, BTreeMap<String, String>>>,
}

/// A single look-alike character and where it comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confusable {
    pub ch: char,
    pub family: String,
    pub description: String,
}

/// All confusables for one Latin letter, grouped by script family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusableEntry {
    pub latin: char,
    pub families: Vec<(String, Vec<Confusable>)>,
}

impl ConfusableEntry {
    /// Every confusable of this entry in table order, across all families
    pub fn confusables(&self) -> impl Iterator<Item = &Confusable> {
        self.families.iter().flat_map(|(_, chars)| chars.iter())
    }

    pub fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfusableTable {
    entries: HashMap<char, ConfusableEntry>,
}

impl ConfusableTable {
    /// Load the built-in table
    pub fn embedded() -> Result<Self, ConfusableTableError> {
        Self::from_json(DEFAULT_TABLE)
    }

    /// Load a table from a JSON file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfusableTableError> {
        if !path.exists() {
            return Err(ConfusableTableError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let table = Self::from_json(&content)?;
        debug!("Loaded {} confusable entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse and validate a table from JSON text
    pub fn from_json(content: &str) -> Result<Self, ConfusableTableError> {
        let raw: Vec<RawEntry> = serde_json::from_str(content)?;
        let mut entries = HashMap::with_capacity(raw.len());

        for (index, raw_entry) in raw.into_iter().enumerate() {
            let entry = validate_entry(index, raw_entry)?;
            if entries.contains_key(&entry.latin) {
                return Err(ConfusableTableError::MalformedEntry {
                    index,
                    reason: format!("duplicate entry for '{}'", entry.latin),
                });
            }
            entries.insert(entry.latin, entry);
        }

        Ok(Self { entries })
    }

    /// Look up the confusables for a lowercase Latin letter
    pub fn lookup(&self, ch: char) -> Option<&ConfusableEntry> {
        self.entries.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entry(index: usize, raw: RawEntry) -> Result<ConfusableEntry, ConfusableTableError> {
    let malformed = |reason: String| ConfusableTableError::MalformedEntry { index, reason };

    let mut latin_chars = raw.latin.chars();
    let latin = match (latin_chars.next(), latin_chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => c,
        _ => {
            return Err(malformed(format!(
                "'latin' must be a single lowercase ASCII letter, got {:?}",
                raw.latin
            )))
        }
    };

    let mut seen: HashSet<char> = HashSet::new();
    let mut families = Vec::new();

    for family_map in raw.similar {
        for (family, chars) in family_map {
            if family.trim().is_empty() {
                return Err(malformed("empty script family name".to_string()));
            }

            let mut confusables = Vec::with_capacity(chars.len());
            for (key, description) in chars {
                let mut key_chars = key.chars();
                let ch = match (key_chars.next(), key_chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(malformed(format!(
                            "confusable {:?} in family {} is not a single character",
                            key, family
                        )))
                    }
                };
                if ch == latin {
                    return Err(malformed(format!("'{}' lists itself as a confusable", latin)));
                }
                if !seen.insert(ch) {
                    return Err(malformed(format!(
                        "confusable '{}' appears more than once for '{}'",
                        ch, latin
                    )));
                }
                confusables.push(Confusable {
                    ch,
                    family: family.clone(),
                    description,
                });
            }

            families.push((family, confusables));
        }
    }

    Ok(ConfusableEntry { latin, families })
}
