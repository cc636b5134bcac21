//! Batch input for analyzing many domains from one file
//!
//! Supports:
//! - Plain text, one domain per line (`#` comments and blank lines skipped)
//! - CSV files with a "domain" column, or one domain per line
//! - JSON files with an array of domain strings or objects with a "domain" field

use crate::analysis::AnalysisOutcome;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("File {0} not found.")]
    FileNotFound(PathBuf),

    #[error("Failed to read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV must have a 'domain' column when using headers")]
    MissingDomainColumn,

    #[error("JSON must be an array of domains or an object with a 'domains' array")]
    UnsupportedJsonShape,
}

/// Input format for batch domain files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Text,
    Csv,
    Json,
}

impl InputFormat {
    /// Detect format from file extension; anything unknown is plain text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref() {
            Some("csv") => Self::Csv,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Read the domain list from a file
pub fn read_domain_file(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match InputFormat::from_path(path) {
        InputFormat::Text => Ok(parse_text_domains(&content)),
        InputFormat::Csv => parse_csv_domains(&content),
        InputFormat::Json => parse_json_domains(&content),
    }
}

/// One domain per line
pub fn parse_text_domains(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Parse domains from CSV content, with or without a "domain" header
pub fn parse_csv_domains(content: &str) -> Result<Vec<String>, InputError> {
    let has_header = content
        .lines()
        .next()
        .map(|line| line.to_lowercase().split(',').any(|h| h.trim() == "domain"))
        .unwrap_or(false);

    if !has_header {
        return Ok(parse_text_domains(content)
            .into_iter()
            .filter_map(|line| line.split(',').next().map(|d| d.trim().to_string()))
            .filter(|d| !d.is_empty())
            .collect());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let domain_idx = reader
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("domain"))
        .ok_or(InputError::MissingDomainColumn)?;

    let mut domains = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(domain) = record.get(domain_idx).map(str::trim).filter(|d| !d.is_empty()) {
            domains.push(domain.to_string());
        }
    }

    Ok(domains)
}

/// Parse domains from JSON content
///
/// Accepts `["a.com"]`, `[{"domain": "a.com"}]` or `{"domains": [...]}`.
pub fn parse_json_domains(content: &str) -> Result<Vec<String>, InputError> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let items = match &value {
        serde_json::Value::Array(arr) => arr,
        serde_json::Value::Object(obj) => match obj.get("domains") {
            Some(serde_json::Value::Array(arr)) => arr,
            _ => return Err(InputError::UnsupportedJsonShape),
        },
        _ => return Err(InputError::UnsupportedJsonShape),
    };

    Ok(items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(domain) => Some(domain.as_str()),
            serde_json::Value::Object(obj) => obj.get("domain").and_then(|d| d.as_str()),
            _ => None,
        })
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect())
}

/// Per-domain line of a batch summary
#[derive(Debug, Clone)]
pub struct DomainSummary {
    pub domain: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total_domains: usize,
    pub successful: usize,
    pub failed: usize,
    pub domain_results: Vec<DomainSummary>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, outcome: &AnalysisOutcome) {
        self.domain_results.push(DomainSummary {
            domain: outcome.domain().to_string(),
            success: true,
            error: None,
        });
    }

    pub fn record_failure(&mut self, domain: &str, error: &str) {
        self.domain_results.push(DomainSummary {
            domain: domain.to_string(),
            success: false,
            error: Some(error.to_string()),
        });
    }

    pub fn finalize(&mut self) {
        self.total_domains = self.domain_results.len();
        self.successful = self.domain_results.iter().filter(|r| r.success).count();
        self.failed = self.total_domains - self.successful;
    }

    /// Failed domains with their error messages
    pub fn failures(&self) -> impl Iterator<Item = &DomainSummary> {
        self.domain_results.iter().filter(|r| !r.success)
    }
}
