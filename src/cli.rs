use clap::Parser;
use std::path::PathBuf;

/// Upper bound on concurrent registration lookups
pub const MAX_PARALLEL_LOOKUPS: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "evilurl")]
#[command(about = "Generate and check IDN homograph variants of a domain")]
#[command(version)]
pub struct Cli {
    /// Domain to analyze
    #[arg(value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// File with domains to analyze (one per line, or CSV/JSON)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print homograph domains only, one per line (no DNS lookups)
    #[arg(short = 'd', long)]
    pub domains_only: bool,

    /// Only report mixed-script homographs
    #[arg(short = 'm', long)]
    pub mixed_only: bool,

    /// Include homographs that do not resolve
    #[arg(short = 'l', long)]
    pub log_full: bool,

    /// JSON output
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Alternative confusable table (JSON)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub charset: Option<PathBuf>,

    /// Configuration file (defaults to ./config/evilurl.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Create default configuration file at ./config/evilurl.toml
    #[arg(long)]
    pub init: bool,

    /// Disable colored output (also respects NO_COLOR environment variable)
    #[arg(long)]
    pub no_color: bool,

    /// Verbose logging (use -v for INFO, -vv for DEBUG)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of concurrent DNS lookups (overrides config)
    #[arg(short = 'p', long, value_name = "N")]
    pub parallel_lookups: Option<usize>,

    /// Maximum DNS queries per second (0 = unlimited, overrides config)
    #[arg(long, value_name = "QPS")]
    pub dns_rate_limit: Option<u32>,

    /// Refuse domains that expand to more candidates than this (0 = unbounded)
    #[arg(long, value_name = "N")]
    pub max_candidates: Option<u64>,
}

impl Cli {
    pub fn is_batch_mode(&self) -> bool {
        self.file.is_some()
    }

    /// Registration lookups are skipped when only domain names are wanted
    pub fn checks_registration(&self) -> bool {
        !self.domains_only
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.init {
            match (&self.domain, &self.file) {
                (None, None) => return Err("A domain or --file is required".to_string()),
                (Some(_), Some(_)) => return Err("Use either a domain or --file, not both".to_string()),
                (Some(d), None) if d.trim().is_empty() => return Err("Domain cannot be empty".to_string()),
                _ => {}
            }
        }

        if self.domains_only && self.json {
            return Err("--domains-only and --json cannot be combined".to_string());
        }

        if let Some(parallel) = self.parallel_lookups {
            if parallel == 0 {
                return Err("Parallel lookups must be greater than 0".to_string());
            }
            if parallel > MAX_PARALLEL_LOOKUPS {
                return Err(format!(
                    "Parallel lookups cannot exceed {} to avoid overwhelming DNS servers",
                    MAX_PARALLEL_LOOKUPS
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("evilurl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_single_domain() {
        let cli = parse(&["example.com"]);
        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        assert!(!cli.is_batch_mode());
        assert!(cli.checks_registration());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-d", "-m", "-l", "-c", "chars.json", "-vv", "example.com"]);
        assert!(cli.domains_only);
        assert!(cli.mixed_only);
        assert!(cli.log_full);
        assert_eq!(cli.charset, Some(PathBuf::from("chars.json")));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.checks_registration());
    }

    #[test]
    fn test_batch_mode() {
        let cli = parse(&["-f", "domains.txt", "-j"]);
        assert!(cli.is_batch_mode());
        assert!(cli.json);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_requires_exactly_one_input() {
        assert!(parse(&[]).validate().is_err());
        assert!(parse(&["-f", "domains.txt", "example.com"]).validate().is_err());
        assert!(parse(&["--init"]).validate().is_ok());
    }

    #[test]
    fn test_parallel_bounds() {
        assert!(parse(&["-p", "0", "example.com"]).validate().is_err());
        assert!(parse(&["-p", "101", "example.com"]).validate().is_err());
        assert!(parse(&["-p", "25", "example.com"]).validate().is_ok());
    }

    #[test]
    fn test_domains_only_conflicts_with_json() {
        assert!(parse(&["-d", "-j", "example.com"]).validate().is_err());
    }
}
