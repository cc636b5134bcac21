#![allow(dead_code)]

use evilurl::dns::{RegistrationChecker, ResolutionError};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// Registration checker answering from a fixed map of domain -> address
#[derive(Default)]
pub struct MapChecker {
    records: HashMap<String, String>,
    failing: Vec<String>,
    delays: HashMap<String, Duration>,
    queried: Mutex<Vec<String>>,
}

impl MapChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, domain: &str, address: &str) -> Self {
        self.records.insert(domain.to_string(), address.to_string());
        self
    }

    /// Lookups for `domain` fail with a timeout
    pub fn with_failure(mut self, domain: &str) -> Self {
        self.failing.push(domain.to_string());
        self
    }

    /// Lookups for `domain` take `delay` to answer
    pub fn with_delay(mut self, domain: &str, delay: Duration) -> Self {
        self.delays.insert(domain.to_string(), delay);
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

impl RegistrationChecker for MapChecker {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Result<Option<String>, ResolutionError>> {
        async move {
            self.queried.lock().unwrap().push(domain.to_string());

            if let Some(delay) = self.delays.get(domain) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.iter().any(|d| d == domain) {
                return Err(ResolutionError::Timeout {
                    domain: domain.to_string(),
                    timeout_secs: 3,
                });
            }
            Ok(self.records.get(domain).cloned())
        }
        .boxed()
    }
}
