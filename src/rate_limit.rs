//! Pacing of outgoing registration lookups

use crate::config::DnsConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Spaces DNS lookups evenly at `dns.rate_limit_qps`.
///
/// Every caller reserves the next free send slot, then sleeps until it. Slots
/// are one interval apart and handed out in arrival order, so concurrent
/// lookups never burst. Idle time is not banked.
#[derive(Debug)]
pub struct LookupPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl LookupPacer {
    /// Pacer for the configured rate, or `None` when the rate is 0 (unlimited)
    pub fn from_config(dns: &DnsConfig) -> Option<Self> {
        Self::per_second(dns.rate_limit_qps)
    }

    pub fn per_second(queries_per_second: u32) -> Option<Self> {
        if queries_per_second == 0 {
            return None;
        }

        Some(Self {
            interval: Duration::from_secs(1) / queries_per_second,
            next_slot: Mutex::new(None),
        })
    }

    /// Wait for this caller's send slot
    pub async fn wait(&self) {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next_slot = Some(slot + self.interval);
            slot
        };

        let delay = slot.saturating_duration_since(Instant::now());
        if !delay.is_zero() {
            debug!("Pacing DNS lookup by {:?}", delay);
            sleep_until(slot).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn within(actual: Duration, expected_ms: u64) -> bool {
        let expected = Duration::from_millis(expected_ms);
        actual >= expected && actual < expected + Duration::from_millis(5)
    }

    #[test]
    fn test_zero_rate_is_unpaced() {
        assert!(LookupPacer::per_second(0).is_none());

        // default config leaves lookups unlimited
        let config = AppConfig::embedded().unwrap();
        assert!(LookupPacer::from_config(&config.dns).is_none());
    }

    #[test]
    fn test_configured_rate() {
        let mut config = AppConfig::embedded().unwrap();
        config.dns.rate_limit_qps = 20;
        let pacer = LookupPacer::from_config(&config.dns).unwrap();
        assert_eq!(pacer.interval, Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_lookups_are_spaced() {
        let pacer = LookupPacer::per_second(4).unwrap();
        let start = Instant::now();

        pacer.wait().await;
        assert!(within(start.elapsed(), 0));

        for _ in 0..4 {
            pacer.wait().await;
        }
        // four further slots at 250ms
        assert!(within(start.elapsed(), 1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_lookups_get_distinct_slots() {
        let pacer = LookupPacer::per_second(10).unwrap();
        let start = Instant::now();

        let waits = (0..3).map(|_| async {
            pacer.wait().await;
            start.elapsed()
        });
        let mut finished = futures::future::join_all(waits).await;
        finished.sort();

        assert!(within(finished[0], 0));
        assert!(within(finished[1], 100));
        assert!(within(finished[2], 200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_is_not_banked() {
        let pacer = LookupPacer::per_second(2).unwrap();
        pacer.wait().await;

        tokio::time::advance(Duration::from_secs(10)).await;

        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        // first is immediate, second waits a full interval
        assert!(within(start.elapsed(), 500));
    }
}
