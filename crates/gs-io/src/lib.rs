//! Output side of the Gauss-Seidel workspace.
//!
//! This crate provides:
//! - **Text rendering** of the solved system, the iteration table and the final answer
//! - **JSON run reports** for archiving or comparing runs

pub mod error;
pub mod render;
mod report;

pub use error::{IoError, Result};
pub use render::{format_solution, format_system, format_trace_table, unknown_names};
pub use report::{REPORT_SCHEMA_VERSION, RunReport, load_report, write_report};
