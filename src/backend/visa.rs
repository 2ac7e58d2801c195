//! VISA-connected Keithley 2636A source meter
//!
//! Talks TSP over VISA: commands go out as `smua.*` script statements,
//! measurements come back from a `print(...)` query. The command text
//! is an opaque payload from the instrument manual; it is carried here
//! as constants and format strings, not derived.
//!
//! Only compiled with the `instrument_visa` feature, which requires a
//! VISA runtime (NI-VISA or compatible) on the host.

use crate::config::InstrumentConfig;
use crate::error::{MonitorError, Result};
use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;
use visa_rs::prelude::*;

use super::instrument::{parse_reading, SourceMeter};

/// Search expression matching every VISA instrument
const FIND_ALL_INSTRUMENTS: &str = "?*::INSTR";

/// Query producing one resistance reading
const CMD_MEASURE_RESISTANCE: &str = "print(smua.measure.r())";

/// Safe idle sequence: zero-volt DC source, autoranging, output off
const SAFE_IDLE_SEQUENCE: &[&str] = &[
    "smua.reset()",
    "smua.source.func = smua.OUTPUT_DCVOLTS",
    "smua.source.levelv = 0.0",
    "smua.source.autorangev = smua.AUTORANGE_ON",
    "smua.measure.autorangei = smua.AUTORANGE_ON",
    "smua.source.output = smua.OUTPUT_OFF",
];

/// I/O timeout for open and reads
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Real instrument behind the [`SourceMeter`] trait
pub struct VisaSourceMeter {
    rm: Option<DefaultRM>,
    instr: Option<Instrument>,
}

impl Default for VisaSourceMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl VisaSourceMeter {
    /// Create an unconnected instrument handle
    pub fn new() -> Self {
        Self {
            rm: None,
            instr: None,
        }
    }

    fn resource_manager(&mut self) -> Result<&DefaultRM> {
        if self.rm.is_none() {
            self.rm = Some(DefaultRM::new()?);
        }
        Ok(self.rm.as_ref().ok_or_else(|| {
            MonitorError::Instrument("VISA resource manager unavailable".to_string())
        })?)
    }

    fn instrument(&mut self) -> Result<&mut Instrument> {
        self.instr
            .as_mut()
            .ok_or_else(|| MonitorError::Instrument("not connected".to_string()))
    }

    fn write_command(&mut self, command: &str) -> Result<()> {
        let instr = self.instrument()?;
        let line = format!("{}\n", command);
        instr
            .write_all(line.as_bytes())
            .map_err(visa_rs::io_to_vs_err)?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let instr = self.instrument()?;
        let mut response = String::new();
        let mut reader = BufReader::new(&*instr);
        reader
            .read_line(&mut response)
            .map_err(visa_rs::io_to_vs_err)?;
        Ok(response)
    }
}

impl SourceMeter for VisaSourceMeter {
    fn list_resources(&mut self) -> Result<Vec<String>> {
        let expr = CString::new(FIND_ALL_INSTRUMENTS)
            .map_err(|e| MonitorError::Instrument(e.to_string()))?;
        let rm = self.resource_manager()?;
        let mut resources = Vec::new();
        match rm.find_res_list(&expr.into()) {
            Ok(list) => {
                for res in list {
                    resources.push(res?.to_string());
                }
            }
            // An empty scan is reported as an error by some VISA
            // implementations; treat it as "nothing found"
            Err(e) => {
                tracing::debug!("VISA resource scan: {}", e);
            }
        }
        tracing::info!("Found devices: {:?}", resources);
        Ok(resources)
    }

    fn connect(&mut self, resource: Option<&str>) -> Result<String> {
        let available = self.list_resources()?;
        let target = match resource {
            Some(r) => r.to_string(),
            None => available.first().cloned().ok_or(MonitorError::NoDeviceFound)?,
        };

        let rm = self.resource_manager()?;
        let name = CString::new(target.clone())
            .map_err(|e| MonitorError::Instrument(e.to_string()))?;
        let instr = rm.open(&name.into(), AccessMode::NO_LOCK, IO_TIMEOUT)?;
        self.instr = Some(instr);
        tracing::info!("Connected to {}", target);
        Ok(target)
    }

    fn disconnect(&mut self) {
        self.instr = None;
    }

    fn is_connected(&self) -> bool {
        self.instr.is_some()
    }

    fn safe_idle(&mut self) -> Result<()> {
        for command in SAFE_IDLE_SEQUENCE {
            self.write_command(command)?;
        }
        Ok(())
    }

    fn configure(&mut self, settings: &InstrumentConfig) -> Result<()> {
        self.write_command("*RST")?;
        self.write_command("smua.reset()")?;
        self.write_command("smua.source.func = smua.OUTPUT_DCAMPS")?;
        self.write_command(&format!("smua.source.leveli = {:e}", settings.bias_current_a))?;
        self.write_command("smua.measure.autorangev = smua.AUTORANGE_ON")?;
        self.write_command(&format!("smua.measure.nplc = {}", settings.nplc))?;
        self.write_command(&format!("smua.measure.delay = {}", settings.measure_delay_s))?;
        self.write_command(&format!("smua.measure.rangev = {}", settings.voltage_range_v))?;
        self.write_command(&format!("smua.measure.rangei = {:e}", settings.current_range_a))?;
        self.write_command("smua.measure.r(smua.nvbuffer1)")?;
        Ok(())
    }

    fn set_output(&mut self, enabled: bool) -> Result<()> {
        let command = if enabled {
            "smua.source.output = smua.OUTPUT_ON"
        } else {
            "smua.source.output = smua.OUTPUT_OFF"
        };
        self.write_command(command)
    }

    fn measure_resistance(&mut self) -> Result<f64> {
        self.write_command(CMD_MEASURE_RESISTANCE)?;
        let response = self.read_line()?;
        parse_reading(&response)
    }
}
