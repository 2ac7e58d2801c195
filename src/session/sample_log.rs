//! Append-only sample sequence for one run
//!
//! Samples arrive from a single producer (the acquisition loop), so
//! ordering is guaranteed by construction; the log only verifies it.
//! Nothing is ever removed or reordered while a run is alive.

use crate::types::Sample;

/// Ordered, append-only sequence of samples with a finite-difference
/// heating-rate estimate over a fixed window.
#[derive(Debug, Default)]
pub struct SampleLog {
    samples: Vec<Sample>,
}

impl SampleLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample.
    ///
    /// Invariant: elapsed time and timestamp are non-decreasing. The
    /// single-producer loop guarantees this; it is checked in debug
    /// builds.
    pub fn push(&mut self, sample: Sample) {
        if let Some(last) = self.samples.last() {
            debug_assert!(sample.elapsed >= last.elapsed);
            debug_assert!(sample.timestamp >= last.timestamp);
        }
        self.samples.push(sample);
    }

    /// Number of samples recorded so far
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// All samples in arrival order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Heating rate in °C/min over the last `window` samples.
    ///
    /// Defined only once more than `window` samples exist:
    /// `(T[i] - T[i-W]) / (elapsed[i] - elapsed[i-W]) * 60`.
    /// Returns `None` before that, or when the elapsed span is zero.
    pub fn heating_rate(&self, window: usize) -> Option<f64> {
        if window == 0 || self.samples.len() <= window {
            return None;
        }
        let i = self.samples.len() - 1;
        let newest = &self.samples[i];
        let oldest = &self.samples[i - window];
        let dt = (newest.elapsed - oldest.elapsed).as_secs_f64();
        if dt <= 0.0 {
            return None;
        }
        Some((newest.temperature_c - oldest.temperature_c) / dt * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::time::Duration;

    fn sample(elapsed_s: f64, temperature_c: f64) -> Sample {
        Sample::new(
            Local::now(),
            Duration::from_secs_f64(elapsed_s),
            1000.0,
            temperature_c,
        )
    }

    #[test]
    fn test_elapsed_non_decreasing() {
        let mut log = SampleLog::new();
        for i in 0..20 {
            log.push(sample(i as f64 * 0.05, 25.0 + i as f64));
        }
        let samples = log.samples();
        for pair in samples.windows(2) {
            assert!(pair[1].elapsed >= pair[0].elapsed);
            assert!(pair[1].timestamp >= pair[0].timestamp);
        }
    }

    #[test]
    fn test_heating_rate_suppressed_below_window() {
        let mut log = SampleLog::new();
        for i in 0..50 {
            log.push(sample(i as f64, 20.0 + i as f64));
        }
        assert_eq!(log.len(), 50);
        assert!(log.heating_rate(50).is_none());
    }

    #[test]
    fn test_heating_rate_at_51_samples() {
        let mut log = SampleLog::new();
        for i in 0..=50 {
            log.push(sample(i as f64, 20.0 + 0.5 * i as f64));
        }
        assert_eq!(log.len(), 51);

        // (T[50] - T[0]) / (elapsed[50] - elapsed[0]) * 60
        let rate = log.heating_rate(50).unwrap();
        let expected = (45.0 - 20.0) / 50.0 * 60.0;
        assert!((rate - expected).abs() < 1e-9, "rate = {}", rate);
    }

    #[test]
    fn test_heating_rate_uses_trailing_window() {
        let mut log = SampleLog::new();
        // 40 flat samples, then 51 rising ones
        for i in 0..40 {
            log.push(sample(i as f64, 10.0));
        }
        for i in 0..51 {
            log.push(sample((40 + i) as f64, 10.0 + i as f64));
        }
        let rate = log.heating_rate(50).unwrap();
        // Window spans samples 40..=90: T rose 50 °C over 50 s
        let expected = 50.0 / 50.0 * 60.0;
        assert!((rate - expected).abs() < 1e-9);
    }

    #[test]
    fn test_heating_rate_zero_span() {
        let mut log = SampleLog::new();
        for _ in 0..5 {
            log.push(sample(1.0, 25.0));
        }
        assert!(log.heating_rate(2).is_none());
    }
}
