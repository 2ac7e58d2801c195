//! Incremental data-file writer
//!
//! Writes one comment header line and then one tab-separated row per
//! sample: `HH:MM:SS.ffffff  t(s)  R(Ohm)  T(C)`, flushed per row so
//! the file stays readable while a run is in progress.

use crate::error::Result;
use crate::types::Sample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Header line written once at the top of every data file
pub const HEADER: &str = "# Time\tt (s)\tR (Ohm)\tT (C)";

/// Writer for one run's data file
#[derive(Debug)]
pub struct LogWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl LogWriter {
    /// Create (or truncate) the data file and write the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", HEADER)?;
        writer.flush()?;
        tracing::info!("Logging run data to {:?}", path);
        Ok(Self { writer, path })
    }

    /// Append one sample as a tab-separated row
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        writeln!(
            self.writer,
            "{}\t{:.3}\t{:.3}\t{:.3}",
            sample.timestamp.format("%H:%M:%S%.6f"),
            sample.elapsed.as_secs_f64(),
            sample.resistance_ohm,
            sample.temperature_c,
        )?;
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
