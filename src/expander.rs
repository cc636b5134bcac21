//! Per-position substitution sets for a single domain label

use crate::confusables::ConfusableTable;
use std::collections::BTreeSet;

/// One character choice at a label position.
///
/// The identity choice (the original character) carries no family or
/// description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitute {
    pub ch: char,
    pub family: Option<String>,
    pub description: Option<String>,
}

impl Substitute {
    fn identity(ch: char) -> Self {
        Self {
            ch,
            family: None,
            description: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.family.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub original: char,
    /// Always non-empty; index 0 is the original character
    pub substitutes: Vec<Substitute>,
}

impl Position {
    /// True when the table offers no alternative for this character
    pub fn is_locked(&self) -> bool {
        self.substitutes.len() == 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelExpansion {
    pub positions: Vec<Position>,
    pub touched_chars: BTreeSet<char>,
    pub touched_families: BTreeSet<String>,
}

impl LabelExpansion {
    /// Whether any position can be substituted at all
    pub fn has_substitutions(&self) -> bool {
        self.positions.iter().any(|p| !p.is_locked())
    }
}

/// Expand a lowercase label into its substitution positions.
///
/// Positions follow the label's code points in order. Characters missing from
/// the table keep a single identity substitute.
pub fn expand(label: &str, table: &ConfusableTable) -> LabelExpansion {
    let mut expansion = LabelExpansion::default();

    for ch in label.chars() {
        let mut substitutes = vec![Substitute::identity(ch)];

        if let Some(entry) = table.lookup(ch) {
            for confusable in entry.confusables() {
                if substitutes.iter().any(|s| s.ch == confusable.ch) {
                    continue;
                }
                substitutes.push(Substitute {
                    ch: confusable.ch,
                    family: Some(confusable.family.clone()),
                    description: Some(confusable.description.clone()),
                });
                expansion.touched_chars.insert(confusable.ch);
            }
            expansion
                .touched_families
                .extend(entry.family_names().map(str::to_string));
        }

        expansion.positions.push(Position {
            original: ch,
            substitutes,
        });
    }

    expansion
}
