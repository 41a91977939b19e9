//! Phase metrics collection for the simulation.
//!
//! Provides structured logging and counters for monitoring simulation
//! progress and health.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Global metrics collector for simulation statistics.
pub struct Metrics {
    phase_count: AtomicU64,
    human_count: AtomicU64,
    zombie_count: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase_count: AtomicU64::new(0),
            human_count: AtomicU64::new(0),
            zombie_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed phase with its duration.
    pub fn record_phase(&self, duration: Duration, humans: usize, zombies: usize) {
        self.phase_count.fetch_add(1, Ordering::Relaxed);
        self.human_count.store(humans as u64, Ordering::Relaxed);
        self.zombie_count.store(zombies as u64, Ordering::Relaxed);

        // Log at info level every 100 phases
        let phase = self.phase_count.load(Ordering::Relaxed);
        if phase % 100 == 0 {
            tracing::info!(
                phase = phase,
                humans = humans,
                zombies = zombies,
                duration_ms = duration.as_millis() as u64,
                "Simulation phase"
            );
        }
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the current phase count.
    #[must_use]
    pub fn phase_count(&self) -> u64 {
        self.phase_count.load(Ordering::Relaxed)
    }

    /// Gets the last recorded human count.
    #[must_use]
    pub fn human_count(&self) -> u64 {
        self.human_count.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.phase_count(), 0);
    }

    #[test]
    fn test_record_phase() {
        let metrics = Metrics::new();
        metrics.record_phase(Duration::from_millis(16), 55, 5);
        assert_eq!(metrics.phase_count(), 1);
        assert_eq!(metrics.human_count(), 55);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let metrics = Metrics::new();
        let first = metrics.elapsed();
        let second = metrics.elapsed();
        assert!(second >= first);
    }

    #[test]
    fn test_increment_counter() {
        let metrics = Metrics::new();
        metrics.increment_counter("shots_fired");
        metrics.increment_counter("shots_fired");
        let counters = metrics.counters.lock().unwrap();
        assert_eq!(
            counters["shots_fired"].load(Ordering::Relaxed),
            2
        );
    }
}
