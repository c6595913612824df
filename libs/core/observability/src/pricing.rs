//! Pricing engine metrics.

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Static recorder for pricing engine events
pub struct PricingMetrics;

impl PricingMetrics {
    /// `outcome` is one of `valid`, `invalid`, `timeout`
    pub fn record_lookup(outcome: &'static str, duration: Duration) {
        counter!("pricing_location_lookups_total", "outcome" => outcome).increment(1);
        histogram!("pricing_location_lookup_duration_seconds", "outcome" => outcome)
            .record(duration.as_secs_f64());
    }

    pub fn record_classification(zone: &str) {
        counter!("pricing_classifications_total", "zone" => zone.to_string()).increment(1);
    }

    /// `outcome` is `created` or `already_locked`
    pub fn record_lock(outcome: &'static str, zone: &str) {
        counter!(
            "pricing_lock_attempts_total",
            "outcome" => outcome,
            "zone" => zone.to_string()
        )
        .increment(1);
    }

    pub fn record_provisional_lock() {
        counter!("pricing_provisional_locks_total").increment(1);
    }

    /// `outcome` is `applied`, `unchanged`, or `closed`
    pub fn record_reevaluation(outcome: &'static str) {
        counter!("pricing_reevaluations_total", "outcome" => outcome).increment(1);
    }

    pub fn record_not_registered() {
        counter!("pricing_not_registered_total").increment(1);
    }
}

/// Records `pricing_operation_duration_seconds` for a facade operation when
/// stopped or dropped, whichever comes first.
pub struct PricingTimer {
    start: Instant,
    operation: &'static str,
    stopped: bool,
}

impl PricingTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
            stopped: false,
        }
    }

    /// Record and return the elapsed time; later calls return zero
    pub fn stop(&mut self) -> Duration {
        if self.stopped {
            return Duration::ZERO;
        }
        self.stopped = true;

        let elapsed = self.start.elapsed();
        histogram!("pricing_operation_duration_seconds", "operation" => self.operation)
            .record(elapsed.as_secs_f64());
        elapsed
    }
}

impl Drop for PricingTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_once() {
        let mut timer = PricingTimer::new("preview");
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.stop() >= Duration::from_millis(2));
        assert_eq!(timer.stop(), Duration::ZERO);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        PricingMetrics::record_lookup("timeout", Duration::from_millis(3000));
        PricingMetrics::record_classification("global");
        PricingMetrics::record_lock("created", "special_region");
        PricingMetrics::record_provisional_lock();
        PricingMetrics::record_reevaluation("applied");
        PricingMetrics::record_not_registered();
    }
}
