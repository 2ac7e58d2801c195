//! Per-run data handling: the in-memory sample sequence and the
//! incremental data-file writer.
//!
//! Both live inside the acquisition worker for the duration of a run
//! and are torn down when the run ends.

pub mod log_writer;
pub mod sample_log;

pub use log_writer::LogWriter;
pub use sample_log::SampleLog;
