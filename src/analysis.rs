//! Homograph analysis of a single domain.
//!
//! normalize → split → expand the registrable label → generate candidates →
//! canonicalize and drop anything encoding like the input → (optional)
//! registration lookups → classify → filter.

use crate::canonical::{to_canonical, EncodingError};
use crate::classifier::is_mixed;
use crate::confusables::ConfusableTable;
use crate::dns::{check_registration, DnsStatus, RegistrationChecker};
use crate::domain_utils::{normalize_domain, split_domain, DomainParts};
use crate::expander::expand;
use crate::generator::{candidate_count, generate, Candidate};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of concurrent registration lookups
pub const DEFAULT_PARALLEL_LOOKUPS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("{domain} expands to {count} candidates, above the configured limit of {limit}")]
    CandidateLimitExceeded {
        domain: String,
        count: String,
        limit: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Resolve each surviving candidate
    pub check_registration: bool,
    /// Drop candidates that do not resolve (needs `check_registration`)
    pub registered_only: bool,
    /// Drop single-script candidates
    pub mixed_only: bool,
    /// Refuse domains whose candidate count exceeds this
    pub max_candidates: Option<u64>,
    pub parallel_lookups: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_registration: true,
            registered_only: true,
            mixed_only: false,
            max_candidates: None,
            parallel_lookups: DEFAULT_PARALLEL_LOOKUPS,
        }
    }
}

impl AnalysisOptions {
    /// Options that enumerate candidates without touching the network
    pub fn offline() -> Self {
        Self {
            check_registration: false,
            registered_only: false,
            ..Self::default()
        }
    }
}

/// A character substitution as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionUsed {
    pub ch: char,
    pub description: String,
}

impl SubstitutionUsed {
    pub fn display(&self) -> String {
        format!("{} → {}", self.ch, self.description)
    }
}

/// One reported homograph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub full_domain: String,
    pub canonical_encoding: String,
    pub registration: DnsStatus,
    pub mixed: bool,
    pub substitutions_used: Vec<SubstitutionUsed>,
}

/// Findings for a domain that produced at least one homograph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    pub domain: String,
    /// Confusable characters available for the label, sorted
    pub homograph_chars: Vec<char>,
    pub candidates_generated: usize,
    pub results: Vec<AnalysisResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Findings(DomainReport),
    /// Nothing distinguishable from the input survived
    NoCombinations {
        domain: String,
        candidates_generated: usize,
    },
}

impl AnalysisOutcome {
    pub fn domain(&self) -> &str {
        match self {
            AnalysisOutcome::Findings(report) => &report.domain,
            AnalysisOutcome::NoCombinations { domain, .. } => domain,
        }
    }

    pub fn candidates_generated(&self) -> usize {
        match self {
            AnalysisOutcome::Findings(report) => report.candidates_generated,
            AnalysisOutcome::NoCombinations {
                candidates_generated, ..
            } => *candidates_generated,
        }
    }

    pub fn results(&self) -> &[AnalysisResult] {
        match self {
            AnalysisOutcome::Findings(report) => &report.results,
            AnalysisOutcome::NoCombinations { .. } => &[],
        }
    }
}

/// A candidate that encodes differently from the input
#[derive(Debug, Clone)]
struct Survivor {
    candidate: Candidate,
    full_domain: String,
    canonical: String,
    canonical_label: String,
}

pub struct HomographAnalyzer<'a> {
    table: &'a ConfusableTable,
    checker: Option<&'a dyn RegistrationChecker>,
    options: AnalysisOptions,
}

impl<'a> HomographAnalyzer<'a> {
    pub fn new(table: &'a ConfusableTable, options: AnalysisOptions) -> Self {
        Self {
            table,
            checker: None,
            options,
        }
    }

    pub fn with_checker(mut self, checker: &'a dyn RegistrationChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    pub async fn analyze(&self, input: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let domain = normalize_domain(input);
        let no_combinations = |candidates_generated| AnalysisOutcome::NoCombinations {
            domain: domain.clone(),
            candidates_generated,
        };

        let parts = match split_domain(&domain) {
            Some(parts) => parts,
            None => {
                debug!("Nothing to analyze in {:?}", input);
                return Ok(no_combinations(0));
            }
        };

        let original_canonical = match to_canonical(&domain) {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!("{}", e);
                return Ok(no_combinations(0));
            }
        };

        let expansion = expand(&parts.label, self.table);
        if !expansion.has_substitutions() {
            info!("No confusable characters in {}", domain);
            return Ok(no_combinations(1));
        }

        if let Some(limit) = self.options.max_candidates {
            let count = candidate_count(&expansion);
            if count.map_or(true, |c| c > limit as u128) {
                return Err(AnalysisError::CandidateLimitExceeded {
                    domain: domain.clone(),
                    count: count.map_or_else(|| "more than 2^128".to_string(), |c| c.to_string()),
                    limit,
                });
            }
        }

        let candidates = generate(&expansion);
        let candidates_generated = candidates.len();
        debug!("{} candidates generated for {}", candidates_generated, domain);

        let survivors = filter_survivors(&parts, &original_canonical, candidates);
        let results = self.evaluate(survivors, &expansion.touched_families).await;

        if results.is_empty() {
            info!("No homographs reported for {}", domain);
            return Ok(no_combinations(candidates_generated));
        }

        Ok(AnalysisOutcome::Findings(DomainReport {
            domain,
            homograph_chars: expansion.touched_chars.into_iter().collect(),
            candidates_generated,
            results,
        }))
    }

    /// Resolve, classify and filter survivors, preserving their order.
    ///
    /// Classification uses the families touched by the whole label expansion.
    async fn evaluate(&self, survivors: Vec<Survivor>, touched_families: &BTreeSet<String>) -> Vec<AnalysisResult> {
        let checker = if self.options.check_registration {
            self.checker
        } else {
            None
        };
        let registered_only = self.options.registered_only && checker.is_some();
        let mixed_only = self.options.mixed_only;
        let parallel = self.options.parallel_lookups.max(1);

        // `buffered` keeps input order regardless of completion order
        let evaluated: Vec<AnalysisResult> = stream::iter(survivors.into_iter().map(|survivor| async move {
            let registration = match checker {
                Some(checker) => check_registration(checker, &survivor.canonical).await,
                None => DnsStatus::NotChecked,
            };
            let mixed = is_mixed(&survivor.canonical_label, touched_families);

            AnalysisResult {
                full_domain: survivor.full_domain,
                canonical_encoding: survivor.canonical,
                registration,
                mixed,
                substitutions_used: survivor
                    .candidate
                    .substitutions
                    .iter()
                    .map(|s| SubstitutionUsed {
                        ch: s.ch,
                        description: s.description.clone(),
                    })
                    .collect(),
            }
        }))
        .buffered(parallel)
        .collect()
        .await;

        evaluated
            .into_iter()
            .filter(|r| !registered_only || r.registration.is_registered())
            .filter(|r| !mixed_only || r.mixed)
            .collect()
    }
}

/// Canonicalize every candidate and keep those that differ from the input.
///
/// Candidates that fail to encode are dropped individually.
fn filter_survivors(parts: &DomainParts, original_canonical: &str, candidates: Vec<Candidate>) -> Vec<Survivor> {
    let mut survivors = Vec::new();

    for candidate in candidates {
        let full_domain = parts.with_label(&candidate.label);
        let encoded = to_canonical(&full_domain).and_then(|canonical| {
            to_canonical(&candidate.label).map(|canonical_label| (canonical, canonical_label))
        });

        let (canonical, canonical_label) = match encoded {
            Ok(pair) => pair,
            Err(EncodingError { input, reason }) => {
                debug!("Dropping candidate {}: cannot encode {} ({})", full_domain, input, reason);
                continue;
            }
        };

        if canonical == original_canonical {
            continue;
        }

        survivors.push(Survivor {
            candidate,
            full_domain,
            canonical,
            canonical_label,
        });
    }

    survivors
}
