//! Mock source meter for testing without hardware
//!
//! Simulates a Pt1000 probe warming up: the resistance starts near room
//! temperature and ramps slowly upward with a little noise. Tests can
//! instead script an exact sequence of readings, or arm a one-shot
//! failure to exercise the abort path.

use crate::config::InstrumentConfig;
use crate::error::{MonitorError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::instrument::SourceMeter;

/// Resource identifier the mock reports
pub const MOCK_RESOURCE: &str = "MOCK0::2636A::INSTR";

/// Resistance at the start of a simulated run (about 25 °C on a Pt1000)
const BASE_RESISTANCE_OHM: f64 = 1097.0;
/// Simulated warming ramp
const RAMP_OHM_PER_S: f64 = 2.0;
/// Peak-to-peak measurement noise
const NOISE_OHM: f64 = 0.05;

/// Simple xorshift generator, enough for measurement noise
fn rand_simple() -> f64 {
    use std::cell::Cell;
    thread_local! {
        static SEED: Cell<u64> = const { Cell::new(0x9E37_79B9) };
    }
    SEED.with(|seed| {
        let mut s = seed.get();
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        seed.set(s);
        (s as f64) / (u64::MAX as f64)
    })
}

/// Mock implementation of [`SourceMeter`]
pub struct MockSourceMeter {
    connected: bool,
    configured: bool,
    output_on: Arc<AtomicBool>,
    started: Option<Instant>,
    /// Scripted readings consumed before the ramp kicks in
    scripted: VecDeque<f64>,
    /// Fail the next read with an unparsable response
    fail_next_read: bool,
    /// Pretend no instrument is attached
    no_devices: bool,
}

impl Default for MockSourceMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSourceMeter {
    /// Create a mock that simulates a slowly warming probe
    pub fn new() -> Self {
        Self {
            connected: false,
            configured: false,
            output_on: Arc::new(AtomicBool::new(false)),
            started: None,
            scripted: VecDeque::new(),
            fail_next_read: false,
            no_devices: false,
        }
    }

    /// Script an exact sequence of readings (ohms); once exhausted the
    /// ramp takes over
    pub fn with_readings(mut self, readings: impl IntoIterator<Item = f64>) -> Self {
        self.scripted = readings.into_iter().collect();
        self
    }

    /// Make the resource scan come back empty
    pub fn with_no_devices(mut self) -> Self {
        self.no_devices = true;
        self
    }

    /// Arm a one-shot malformed response on the next read
    pub fn fail_next_read(&mut self) {
        self.fail_next_read = true;
    }

    /// Shared handle observing the output relay, for asserting that
    /// teardown switched it off
    pub fn output_handle(&self) -> Arc<AtomicBool> {
        self.output_on.clone()
    }
}

impl SourceMeter for MockSourceMeter {
    fn list_resources(&mut self) -> Result<Vec<String>> {
        if self.no_devices {
            Ok(Vec::new())
        } else {
            Ok(vec![MOCK_RESOURCE.to_string()])
        }
    }

    fn connect(&mut self, resource: Option<&str>) -> Result<String> {
        if self.no_devices {
            return Err(MonitorError::NoDeviceFound);
        }
        self.connected = true;
        Ok(resource.unwrap_or(MOCK_RESOURCE).to_string())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.configured = false;
        self.started = None;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn safe_idle(&mut self) -> Result<()> {
        if !self.connected {
            return Err(MonitorError::Instrument("not connected".to_string()));
        }
        self.output_on.store(false, Ordering::SeqCst);
        self.configured = false;
        Ok(())
    }

    fn configure(&mut self, _settings: &InstrumentConfig) -> Result<()> {
        if !self.connected {
            return Err(MonitorError::Instrument("not connected".to_string()));
        }
        self.configured = true;
        Ok(())
    }

    fn set_output(&mut self, enabled: bool) -> Result<()> {
        if !self.connected {
            return Err(MonitorError::Instrument("not connected".to_string()));
        }
        self.output_on.store(enabled, Ordering::SeqCst);
        if enabled {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn measure_resistance(&mut self) -> Result<f64> {
        if !self.connected || !self.output_on.load(Ordering::SeqCst) {
            return Err(MonitorError::Instrument(
                "output is off, nothing to measure".to_string(),
            ));
        }
        if self.fail_next_read {
            self.fail_next_read = false;
            return super::instrument::parse_reading("ovf");
        }
        if let Some(r) = self.scripted.pop_front() {
            return Ok(r);
        }
        let elapsed = self
            .started
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let noise = (rand_simple() - 0.5) * NOISE_OHM;
        Ok(BASE_RESISTANCE_OHM + RAMP_OHM_PER_S * elapsed + noise)
    }
}
