use chrono::Local;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Only results and errors
    Summary = 1,  // Run summary (default)
    Detailed = 2, // Per-domain progress
    Debug = 3,    // Everything
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn tracing_directive(self) -> &'static str {
        match self {
            VerbosityLevel::Silent | VerbosityLevel::Summary => "evilurl=warn",
            VerbosityLevel::Detailed => "evilurl=info",
            VerbosityLevel::Debug => "evilurl=debug",
        }
    }
}

/// Install the stderr `tracing` subscriber; `RUST_LOG` takes precedence
pub fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.tracing_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Default, Clone)]
struct RunMetadata {
    domains_processed: usize,
    domains_failed: usize,
    candidates_generated: usize,
    homographs_reported: usize,
    registered_homographs: usize,
}

/// User-facing status lines and the end-of-run summary
#[derive(Clone)]
pub struct AnalysisLogger {
    verbosity: VerbosityLevel,
    started: Instant,
    metadata: Arc<Mutex<RunMetadata>>,
}

impl AnalysisLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            started: Instant::now(),
            metadata: Arc::new(Mutex::new(RunMetadata::default())),
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("WARN", message);
        }
    }

    pub fn error(&self, message: &str) {
        // errors are never hidden
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        eprintln!("[{}] {}: {}", Local::now().format("%H:%M:%S%.3f"), level, message);
    }

    pub fn record_domain(&self, candidates: usize, homographs: usize, registered: usize) {
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.domains_processed += 1;
            metadata.candidates_generated += candidates;
            metadata.homographs_reported += homographs;
            metadata.registered_homographs += registered;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.domains_processed += 1;
            metadata.domains_failed += 1;
        }
    }

    pub fn log_analysis_start(&self, domain: &str) {
        self.info(&format!("Analyzing {}", domain));
    }

    pub fn log_analysis_complete(&self, domain: &str, candidates: usize, homographs: usize) {
        self.info(&format!(
            "{}: {} candidates generated, {} homographs reported",
            domain, candidates, homographs
        ));
    }

    /// Final summary on stderr so stdout stays machine-readable
    pub fn print_final_summary(&self) {
        if self.verbosity < VerbosityLevel::Summary {
            return;
        }
        let metadata = match self.metadata.lock() {
            Ok(m) => m.clone(),
            Err(_) => return,
        };

        eprintln!();
        eprintln!("=== ANALYSIS SUMMARY ===");
        eprintln!("Analysis Duration: {:.2}s", self.started.elapsed().as_secs_f64());
        eprintln!("Domains Processed: {}", metadata.domains_processed);
        if metadata.domains_failed > 0 {
            eprintln!("Domains Failed: {}", metadata.domains_failed);
        }
        eprintln!("Candidates Generated: {}", metadata.candidates_generated);
        eprintln!("Homographs Reported: {}", metadata.homographs_reported);
        eprintln!("Registered Homographs: {}", metadata.registered_homographs);
        eprintln!("========================");
    }
}
