//! Diagnostic codes and error reporting
//!
//! Diagnostic codes are versioned and stable.
//! Never rename or remove codes; add new ones instead.

use serde::{Deserialize, Serialize};
use crate::cell::Cell;

/// Diagnostic code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Definition (1xxx)
    /// Illegal schema definition
    DefinitionError,

    /// Two data files map to the same table name
    DefinitionNameCollision,

    // Data (2xxx)
    /// Cells do not fit the declared layout
    DataStructureError,

    /// Column type could not be inferred or validated
    TypeInferenceError,

    /// Source file missing or unreadable
    IoError,

    // Constraints (3xxx)
    /// Constraint verification failed (batch)
    ConstraintViolation,

    /// Duplicate primary key
    ConstraintDuplicatePrimaryKey,

    /// Duplicate unique key
    ConstraintDuplicateUniqueKey,

    /// Foreign key target row missing
    ConstraintMissingForeignTarget,

    /// Value outside declared range or enum set
    ConstraintOutOfRange,

    // Schema drift (4xxx)
    /// A new data table was discovered
    SchemaTableDiscovered,

    /// A previously resolved table no longer has data
    SchemaTableDeleted,

    // General (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefinitionError => "DEFINITION_ERROR",
            Self::DefinitionNameCollision => "DEFINITION_NAME_COLLISION",
            Self::DataStructureError => "DATA_STRUCTURE_ERROR",
            Self::TypeInferenceError => "TYPE_INFERENCE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Self::ConstraintDuplicatePrimaryKey => "CONSTRAINT_DUPLICATE_PRIMARY_KEY",
            Self::ConstraintDuplicateUniqueKey => "CONSTRAINT_DUPLICATE_UNIQUE_KEY",
            Self::ConstraintMissingForeignTarget => "CONSTRAINT_MISSING_FOREIGN_TARGET",
            Self::ConstraintOutOfRange => "CONSTRAINT_OUT_OF_RANGE",
            Self::SchemaTableDiscovered => "SCHEMA_TABLE_DISCOVERED",
            Self::SchemaTableDeleted => "SCHEMA_TABLE_DELETED",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - blocking issue
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where in the data a diagnostic points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Qualified table or bean name
    pub scope: String,

    /// Row (1-indexed)
    pub row: Option<usize>,

    /// Column letters (A, B, ..., AA)
    pub column: Option<String>,
}

impl Location {
    /// Location covering a whole table or bean
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            row: None,
            column: None,
        }
    }

    /// Location of a single cell
    pub fn at_cell(scope: impl Into<String>, cell: &Cell) -> Self {
        Self {
            scope: scope.into(),
            row: Some(cell.row + 1),
            column: Some(cell.col_letters()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.scope)?;
        if let (Some(row), Some(col)) = (self.row, &self.column) {
            write!(f, "!{}{}", col, row)?;
        }
        Ok(())
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Deepest root cause, when the diagnostic wraps an error
    pub cause: Option<String>,

    /// Remediation guidance
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            cause: None,
            hint: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the root cause
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Set remediation guidance
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Build an error-severity diagnostic from a compilation error
    pub fn from_error(scope: &str, err: &crate::Error) -> Self {
        let location = match err.cell() {
            Some(cell) => Location::at_cell(scope, cell),
            None => Location::new(scope),
        };

        let mut diag = Self::new(err.code(), Severity::Error, err.to_string())
            .with_location(location)
            .with_cause(root_cause(err));
        if let Some(hint) = err.hint() {
            diag = diag.with_hint(hint);
        }
        diag
    }
}

impl From<&crate::Violation> for Diagnostic {
    fn from(violation: &crate::Violation) -> Self {
        let location = match &violation.cell {
            Some(cell) => Location::at_cell(&violation.scope, cell),
            None => Location::new(&violation.scope),
        };
        Self::new(violation.kind.code(), Severity::Error, violation.message.clone()).with_location(location)
    }
}

/// Walk an error's source chain down to the deepest cause
pub fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// Receiver of per-table and per-run diagnostics
///
/// Library code reports through this trait and never prints.
pub trait DiagnosticSink {
    /// Record one diagnostic
    fn push(&mut self, diagnostic: Diagnostic);

    /// Report a failure for a qualified name with an optional root cause
    fn report(&mut self, qualified_name: &str, message: &str, cause: Option<&(dyn std::error::Error + 'static)>) {
        let mut diag = Diagnostic::new(DiagnosticCode::Warning, Severity::Warn, message)
            .with_location(Location::new(qualified_name));
        if let Some(cause) = cause {
            diag = diag.with_cause(root_cause(cause));
        }
        self.push(diag);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn push(&mut self, diagnostic: Diagnostic) {
        Vec::push(self, diagnostic);
    }
}
