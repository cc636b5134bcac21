//! Cartesian-product candidate generation over a label expansion.
//!
//! Enumeration is exhaustive: the number of candidates is the product of the
//! substitute-set sizes of every position. Callers that need a bound check
//! [`candidate_count`] first; nothing here truncates.

use crate::expander::{LabelExpansion, Substitute};
use std::collections::HashSet;

/// A substituted (non-identity) character used by a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub ch: char,
    pub family: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    /// Substitutions in position order, identity picks omitted
    pub substitutions: Vec<Substitution>,
}

/// Exact number of raw candidates, or `None` if it overflows `u128`
pub fn candidate_count(expansion: &LabelExpansion) -> Option<u128> {
    expansion
        .positions
        .iter()
        .try_fold(1u128, |acc, p| acc.checked_mul(p.substitutes.len() as u128))
}

/// Enumerate every candidate spelling of the expanded label.
///
/// Output order is deterministic: an odometer over position indices with the
/// last position varying fastest, so the original label always comes first.
/// An expansion with no positions yields exactly one empty candidate.
pub fn generate(expansion: &LabelExpansion) -> Vec<Candidate> {
    let positions = &expansion.positions;
    let mut indices = vec![0usize; positions.len()];
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    loop {
        let picks: Vec<&Substitute> = positions
            .iter()
            .zip(&indices)
            .map(|(p, &i)| &p.substitutes[i])
            .collect();

        let label: String = picks.iter().map(|s| s.ch).collect();
        if seen.insert(label.clone()) {
            let substitutions = picks
                .iter()
                .filter(|s| !s.is_identity())
                .map(|s| Substitution {
                    ch: s.ch,
                    family: s.family.clone().unwrap_or_default(),
                    description: s.description.clone().unwrap_or_default(),
                })
                .collect();
            candidates.push(Candidate { label, substitutions });
        }

        // Advance the odometer; finished once every digit has wrapped.
        let mut pos = positions.len();
        loop {
            if pos == 0 {
                return candidates;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < positions[pos].substitutes.len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}
