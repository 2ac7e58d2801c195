//! Application module
//!
//! Convenience re-export of the main application type.

pub use crate::frontend::MonitorApp;
