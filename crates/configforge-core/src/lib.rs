//! configforge core
//!
//! Shared domain primitives: positioned cells, the error taxonomy,
//! diagnostics and run reports, and the project configuration.
//! Never rename diagnostic codes - they are part of the public API.

pub mod cell;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod report;

pub use cell::{Cell, column_letters};
pub use config::{Config, ConfigError, DataConfig, SeverityThreshold, ViewConfig};
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSink, Location, Severity, root_cause};
pub use error::{Error, Result, Violation, ViolationKind};
pub use report::{Report, ReportSummary, ReportVersion};
