use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use evilurl::analysis::{AnalysisOptions, AnalysisOutcome, HomographAnalyzer};
use evilurl::batch::{read_domain_file, BatchSummary, InputError};
use evilurl::cli::Cli;
use evilurl::config::AppConfig;
use evilurl::confusables::ConfusableTable;
use evilurl::dns::DnsRegistrationChecker;
use evilurl::export::{self, DomainRecord};
use evilurl::logger::{init_tracing, AnalysisLogger, VerbosityLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let verbosity = VerbosityLevel::from_verbose_count(cli.verbose);
    init_tracing(verbosity);
    let logger = AnalysisLogger::new(verbosity);

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Handle --init flag first (before any other processing)
    if cli.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                return Ok(());
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // CLI overrides
    if let Some(parallel) = cli.parallel_lookups {
        config.dns.parallel_lookups = parallel;
    }
    if let Some(qps) = cli.dns_rate_limit {
        config.dns.rate_limit_qps = qps;
    }
    if let Some(max) = cli.max_candidates {
        config.analysis.max_candidates = max;
    }

    let table_path = cli.charset.as_deref().or_else(|| config.confusables.table_path());
    let table = match load_table(table_path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    logger.debug(&format!("Loaded {} confusable entries", table.len()));

    let checker = if cli.checks_registration() {
        match DnsRegistrationChecker::from_config(&config) {
            Ok(checker) => Some(checker),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let options = AnalysisOptions {
        check_registration: cli.checks_registration(),
        registered_only: cli.checks_registration() && !cli.log_full,
        mixed_only: cli.mixed_only,
        max_candidates: config.analysis.candidate_limit(),
        parallel_lookups: config.dns.parallel_lookups,
    };
    let mut analyzer = HomographAnalyzer::new(&table, options);
    if let Some(checker) = &checker {
        analyzer = analyzer.with_checker(checker);
    }

    let domains = match &cli.file {
        Some(path) => match read_domain_file(path) {
            Err(e @ InputError::FileNotFound(_)) => {
                logger.error(&e.to_string());
                return Ok(());
            }
            other => other.with_context(|| format!("Failed to read domains from {}", path.display()))?,
        },
        None => cli.domain.iter().cloned().collect(),
    };

    if !cli.json && !cli.domains_only {
        println!("{}", export::BANNER);
    }

    let mut summary = BatchSummary::new();
    // Batch JSON is printed once, after every domain has been analyzed
    let collect_json = cli.json && cli.is_batch_mode();
    let mut batch_outcomes: Vec<(String, Result<AnalysisOutcome, String>)> = Vec::new();

    for domain in &domains {
        logger.log_analysis_start(domain);

        match analyzer.analyze(domain).await {
            Ok(outcome) => {
                if !collect_json {
                    print_outcome(&cli, &outcome)?;
                }

                let results = outcome.results();
                let registered = results.iter().filter(|r| r.registration.is_registered()).count();
                logger.log_analysis_complete(outcome.domain(), outcome.candidates_generated(), results.len());
                logger.record_domain(outcome.candidates_generated(), results.len(), registered);
                summary.record_outcome(&outcome);
                if collect_json {
                    batch_outcomes.push((domain.clone(), Ok(outcome)));
                }
            }
            Err(e) => {
                logger.error(&e.to_string());
                logger.record_failure();
                summary.record_failure(domain, &e.to_string());
                if collect_json {
                    batch_outcomes.push((domain.clone(), Err(e.to_string())));
                }
            }
        }
    }

    if collect_json {
        let records: Vec<DomainRecord> = batch_outcomes
            .iter()
            .map(|(domain, result)| match result {
                Ok(outcome) => DomainRecord::from_outcome(outcome),
                Err(error) => DomainRecord::failed(domain, error),
            })
            .collect();
        let json = export::render_batch_json(&records).context("Failed to serialize batch results")?;
        println!("{}", json);
    }

    summary.finalize();
    if cli.is_batch_mode() {
        logger.info(&format!(
            "Batch finished: {} domains, {} successful, {} failed",
            summary.total_domains, summary.successful, summary.failed
        ));
        for failed in summary.failures() {
            logger.warn(&format!(
                "{}: {}",
                failed.domain,
                failed.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    logger.print_final_summary();
    Ok(())
}

fn load_table(path: Option<&Path>) -> Result<ConfusableTable, evilurl::confusables::ConfusableTableError> {
    match path {
        Some(path) => ConfusableTable::load_from_path(path),
        None => ConfusableTable::embedded(),
    }
}

fn print_outcome(cli: &Cli, outcome: &AnalysisOutcome) -> Result<()> {
    if cli.json {
        let json = export::render_json(outcome).context("Failed to serialize results")?;
        println!("{}", json);
        return Ok(());
    }

    match outcome {
        AnalysisOutcome::NoCombinations { .. } if cli.domains_only => {
            eprintln!("{}", export::render_no_combinations());
        }
        AnalysisOutcome::NoCombinations { .. } => {
            println!("{}", export::render_no_combinations());
        }
        AnalysisOutcome::Findings(_) if cli.domains_only => {
            println!("{}", export::render_domains_only(outcome));
        }
        AnalysisOutcome::Findings(report) => {
            println!("{}", export::render_report_header(report));
            println!();
            println!("{}", export::render_table(report));
            println!();
        }
    }

    Ok(())
}
