use crate::analysis::{AnalysisOutcome, AnalysisResult, DomainReport};
use crate::dns::DnsStatus;
use console::{measure_text_width, Style};
use serde::Serialize;

pub const BANNER: &str = r#"
 ██████████ █████   █████ █████ █████          █████  █████ ███████████   █████
░░███░░░░░█░░███   ░░███ ░░███ ░░███          ░░███  ░░███ ░░███░░░░░███ ░░███
 ░███  █ ░  ░███    ░███  ░███  ░███           ░███   ░███  ░███    ░███  ░███
 ░██████    ░███    ░███  ░███  ░███           ░███   ░███  ░██████████   ░███
 ░███░░█    ░░███   ███   ░███  ░███           ░███   ░███  ░███░░░░░███  ░███
 ░███ ░   █  ░░░█████░    ░███  ░███      █    ░███   ░███  ░███    ░███  ░███      █
 ██████████    ░░███      █████ ███████████    ░░████████   █████   █████ ███████████
░░░░░░░░░░      ░░░      ░░░░░ ░░░░░░░░░░░      ░░░░░░░░   ░░░░░   ░░░░░ ░░░░░░░░░░░
"#;

pub const NO_COMBINATIONS_MESSAGE: &str = "No unicode combinations found for the current character set";

/// JSON shape of a reported homograph
#[derive(Debug, Serialize)]
pub struct HomographRecord<'a> {
    pub homograph_domain: &'a str,
    pub punycode: &'a str,
    pub dns: &'a DnsStatus,
    pub mixed: bool,
    pub combinations: Vec<String>,
}

impl<'a> From<&'a AnalysisResult> for HomographRecord<'a> {
    fn from(result: &'a AnalysisResult) -> Self {
        Self {
            homograph_domain: &result.full_domain,
            punycode: &result.canonical_encoding,
            dns: &result.registration,
            mixed: result.mixed,
            combinations: result.substitutions_used.iter().map(|s| s.display()).collect(),
        }
    }
}

pub fn render_json(outcome: &AnalysisOutcome) -> serde_json::Result<String> {
    let records: Vec<HomographRecord> = outcome.results().iter().map(HomographRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

/// One analyzed domain inside a batch JSON document
#[derive(Debug, Serialize)]
pub struct DomainRecord<'a> {
    pub domain: &'a str,
    pub homographs: Vec<HomographRecord<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> DomainRecord<'a> {
    pub fn from_outcome(outcome: &'a AnalysisOutcome) -> Self {
        Self {
            domain: outcome.domain(),
            homographs: outcome.results().iter().map(HomographRecord::from).collect(),
            error: None,
        }
    }

    pub fn failed(domain: &'a str, error: &'a str) -> Self {
        Self {
            domain,
            homographs: Vec::new(),
            error: Some(error),
        }
    }
}

/// Whole batch as a single JSON array, one object per input domain
pub fn render_batch_json(records: &[DomainRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Homograph domains only, one per line
pub fn render_domains_only(outcome: &AnalysisOutcome) -> String {
    outcome
        .results()
        .iter()
        .map(|r| r.full_domain.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_no_combinations() -> String {
    Style::new().red().apply_to(NO_COMBINATIONS_MESSAGE).to_string()
}

/// Report header: analyzed domain and the confusable characters in play
pub fn render_report_header(report: &DomainReport) -> String {
    let bullet = format!(
        "{}*{}",
        Style::new().green().apply_to("["),
        Style::new().green().apply_to("]")
    );
    let chars: Vec<String> = report.homograph_chars.iter().map(|c| c.to_string()).collect();

    format!(
        "{} Domain: {}\n{} Homograph characters used: {}",
        bullet,
        Style::new().yellow().apply_to(&report.domain),
        bullet,
        Style::new().green().apply_to(chars.join(" "))
    )
}

/// Detailed results table
pub fn render_table(report: &DomainReport) -> String {
    const HEADERS: [&str; 6] = ["#", "HOMOGRAPH DOMAIN", "PUNYCODE", "DNS", "MIXED", "COMBINATIONS"];

    let rows: Vec<[String; 6]> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                (i + 1).to_string(),
                r.full_domain.clone(),
                r.canonical_encoding.clone(),
                r.registration.to_string(),
                if r.mixed { "yes" } else { "no" }.to_string(),
                r.substitutions_used
                    .iter()
                    .map(|s| s.display())
                    .collect::<Vec<_>>()
                    .join(", "),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| measure_text_width(h)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let header_style = Style::new().bold();
    let mut out = String::new();

    let header_line: Vec<String> = HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, &w)| header_style.apply_to(pad(h, w)).to_string())
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
    out.push_str(&rule.join("  "));

    for (row, result) in rows.iter().zip(&report.results) {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (cell, &w))| {
                let padded = pad(cell, w);
                match col {
                    3 => dns_style(&result.registration).apply_to(padded).to_string(),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
    }

    out
}

fn dns_style(status: &DnsStatus) -> Style {
    match status {
        DnsStatus::Registered(_) => Style::new().red(),
        DnsStatus::Unset => Style::new().yellow(),
        DnsStatus::NotChecked => Style::new().dim(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = measure_text_width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SubstitutionUsed;

    fn report() -> DomainReport {
        DomainReport {
            domain: "example.com".to_string(),
            homograph_chars: vec!['а', 'е'],
            candidates_generated: 4,
            results: vec![
                AnalysisResult {
                    full_domain: "еxample.com".to_string(),
                    canonical_encoding: "xn--xample-2of.com".to_string(),
                    registration: DnsStatus::Registered("93.184.216.34".to_string()),
                    mixed: true,
                    substitutions_used: vec![SubstitutionUsed {
                        ch: 'е',
                        description: "CYRILLIC SMALL LETTER IE".to_string(),
                    }],
                },
                AnalysisResult {
                    full_domain: "exаmple.com".to_string(),
                    canonical_encoding: "xn--exmple-4nf.com".to_string(),
                    registration: DnsStatus::Unset,
                    mixed: true,
                    substitutions_used: vec![SubstitutionUsed {
                        ch: 'а',
                        description: "CYRILLIC SMALL LETTER A".to_string(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_render_json_shape() {
        let outcome = AnalysisOutcome::Findings(report());
        let json: serde_json::Value = serde_json::from_str(&render_json(&outcome).unwrap()).unwrap();

        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["homograph_domain"], "еxample.com");
        assert_eq!(records[0]["punycode"], "xn--xample-2of.com");
        assert_eq!(records[0]["dns"], "93.184.216.34");
        assert_eq!(records[0]["mixed"], true);
        assert_eq!(records[0]["combinations"][0], "е → CYRILLIC SMALL LETTER IE");
        assert_eq!(records[1]["dns"], "UNSET");
    }

    #[test]
    fn test_render_json_no_combinations() {
        let outcome = AnalysisOutcome::NoCombinations {
            domain: "r.com".to_string(),
            candidates_generated: 1,
        };
        assert_eq!(render_json(&outcome).unwrap(), "[]");
    }

    #[test]
    fn test_render_batch_json_is_one_document() {
        let findings = AnalysisOutcome::Findings(report());
        let empty = AnalysisOutcome::NoCombinations {
            domain: "r.com".to_string(),
            candidates_generated: 1,
        };
        let records = vec![
            DomainRecord::from_outcome(&findings),
            DomainRecord::from_outcome(&empty),
            DomainRecord::failed("big.com", "too many candidates"),
        ];

        let json: serde_json::Value = serde_json::from_str(&render_batch_json(&records).unwrap()).unwrap();
        let domains = json.as_array().unwrap();
        assert_eq!(domains.len(), 3);

        assert_eq!(domains[0]["domain"], "example.com");
        assert_eq!(domains[0]["homographs"][0]["punycode"], "xn--xample-2of.com");
        assert_eq!(domains[0]["homographs"][1]["dns"], "UNSET");
        assert!(domains[0].get("error").is_none());

        assert_eq!(domains[1]["domain"], "r.com");
        assert_eq!(domains[1]["homographs"], serde_json::json!([]));

        assert_eq!(domains[2]["domain"], "big.com");
        assert_eq!(domains[2]["error"], "too many candidates");
    }

    #[test]
    fn test_render_domains_only() {
        let outcome = AnalysisOutcome::Findings(report());
        assert_eq!(render_domains_only(&outcome), "еxample.com\nexаmple.com");
    }

    #[test]
    fn test_render_table_contains_rows() {
        console::set_colors_enabled(false);
        let table = render_table(&report());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("#  HOMOGRAPH DOMAIN"));
        assert!(lines[2].contains("93.184.216.34"));
        assert!(lines[3].contains("UNSET"));
        assert!(lines[3].contains("а → CYRILLIC SMALL LETTER A"));
    }

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("а", 3), "а  ");
        assert_eq!(pad("abc", 2), "abc");
    }
}
