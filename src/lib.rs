pub mod analysis;
pub mod batch;
pub mod canonical;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod confusables;
pub mod dns;
pub mod domain_utils;
pub mod expander;
pub mod export;
pub mod generator;
pub mod logger;
pub mod rate_limit;

pub use analysis::{AnalysisOptions, AnalysisOutcome, AnalysisResult, DomainReport, HomographAnalyzer};
pub use confusables::ConfusableTable;
pub use dns::{DnsRegistrationChecker, DnsStatus, RegistrationChecker};
