//! CLI library components for the QC report generator.

pub mod driver;
pub mod logging;
pub mod types;
