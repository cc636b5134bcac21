//! Mixed-script heuristic.
//!
//! A candidate counts as a single-script ("pure") homograph only when the
//! label expansion touched exactly one script family and the encoded label
//! holds exactly two ACE separator hyphens, i.e. `xn--` with no delimiter
//! before the encoded run. That is the shape of a label whose every character
//! was replaced. Everything else is mixed. This is approximate; it is not a
//! UTS #39 skeleton check.

use std::collections::BTreeSet;

/// ACE separator counted by the heuristic
pub const SEPARATOR: char = '-';

/// Separator count of a single-run encoded label (`xn--…`)
const PURE_SEPARATOR_COUNT: usize = 2;

pub fn separator_count(canonical_label: &str) -> usize {
    canonical_label.chars().filter(|&c| c == SEPARATOR).count()
}

/// Decide whether a candidate mixes scripts, given the families touched by its label
pub fn is_mixed<S: AsRef<str>>(canonical_label: &str, families: &BTreeSet<S>) -> bool {
    !(families.len() == 1 && separator_count(canonical_label) == PURE_SEPARATOR_COUNT)
}
