//! Error taxonomy shared by every compilation phase
//!
//! Table-local errors (data structure, type inference) exclude a single table
//! from the run. Everything else aborts the run.

use crate::cell::Cell;
use crate::diagnostic::DiagnosticCode;
use std::path::PathBuf;

/// Result alias used across the workspace
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Kind of constraint that a value failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Two rows share a primary key
    DuplicatePrimaryKey,

    /// Two rows share a unique key
    DuplicateUniqueKey,

    /// Foreign key points at a row that does not exist
    MissingForeignTarget,

    /// Value outside its declared range or enum set
    OutOfRange,
}

impl ViolationKind {
    /// Diagnostic code reported for this kind
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::DuplicatePrimaryKey => DiagnosticCode::ConstraintDuplicatePrimaryKey,
            Self::DuplicateUniqueKey => DiagnosticCode::ConstraintDuplicateUniqueKey,
            Self::MissingForeignTarget => DiagnosticCode::ConstraintMissingForeignTarget,
            Self::OutOfRange => DiagnosticCode::ConstraintOutOfRange,
        }
    }
}

/// One constraint violation found during verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// What failed
    pub kind: ViolationKind,

    /// Qualified name of the bean or table that declares the constraint
    pub scope: String,

    /// Offending cell, when the value came from one
    pub cell: Option<Cell>,

    /// Human-readable detail
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)?;
        if let Some(cell) = &self.cell {
            write!(f, " ({})", cell)?;
        }
        Ok(())
    }
}

/// Errors raised while defining, resolving or compiling configuration data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Illegal schema: duplicate names, bad nesting, malformed attributes
    #[error("definition error in {scope}: {message}")]
    Definition { scope: String, message: String },

    /// Cells do not fit the declared layout
    #[error("data structure error in {scope}: {message}{}", fmt_cell(.cell))]
    DataStructure {
        scope: String,
        cell: Option<Cell>,
        message: String,
    },

    /// A value could not be typed while completing the schema
    #[error("type inference error in {scope}: {message}{}", fmt_cell(.cell))]
    TypeInference {
        scope: String,
        cell: Option<Cell>,
        message: String,
    },

    /// Constraint verification failed; all violations are collected
    #[error("{} constraint violation(s), first: {}", .0.len(), fmt_first(.0))]
    ConstraintViolation(Vec<Violation>),

    /// Source file missing or unreadable
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn fmt_cell(cell: &Option<Cell>) -> String {
    cell.as_ref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

fn fmt_first(violations: &[Violation]) -> String {
    violations
        .first()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl Error {
    /// Definition error helper
    pub fn definition(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Definition {
            scope: scope.into(),
            message: message.into(),
        }
    }

    /// Data structure error helper
    pub fn data_structure(
        scope: impl Into<String>,
        cell: Option<&Cell>,
        message: impl Into<String>,
    ) -> Self {
        Self::DataStructure {
            scope: scope.into(),
            cell: cell.cloned(),
            message: message.into(),
        }
    }

    /// Type inference error helper
    pub fn type_inference(
        scope: impl Into<String>,
        cell: Option<&Cell>,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeInference {
            scope: scope.into(),
            cell: cell.cloned(),
            message: message.into(),
        }
    }

    /// I/O error helper
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only disqualifies the table it was raised for
    pub fn is_table_local(&self) -> bool {
        matches!(self, Self::DataStructure { .. } | Self::TypeInference { .. })
    }

    /// The cell the error points at, if any
    pub fn cell(&self) -> Option<&Cell> {
        match self {
            Self::DataStructure { cell, .. } | Self::TypeInference { cell, .. } => cell.as_ref(),
            _ => None,
        }
    }

    /// Stable diagnostic code for this error
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::Definition { .. } => DiagnosticCode::DefinitionError,
            Self::DataStructure { .. } => DiagnosticCode::DataStructureError,
            Self::TypeInference { .. } => DiagnosticCode::TypeInferenceError,
            Self::ConstraintViolation(_) => DiagnosticCode::ConstraintViolation,
            Self::Io { .. } => DiagnosticCode::IoError,
        }
    }

    /// Remediation guidance shown next to fatal or table-level failures
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TypeInference { .. } => {
                Some("declare the column type manually in the schema definition")
            }
            Self::DataStructure { .. } => Some(
                "check that the cells match the declared column span and that list items stop at the first empty cell",
            ),
            Self::Definition { .. } => Some("fix the schema definition file"),
            Self::Io { .. } => Some("check the data directory and file permissions"),
            Self::ConstraintViolation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_local_classification() {
        assert!(Error::data_structure("items", None, "bad").is_table_local());
        assert!(Error::type_inference("items", None, "bad").is_table_local());
        assert!(!Error::definition("items", "dup").is_table_local());
        assert!(!Error::ConstraintViolation(vec![]).is_table_local());
    }

    #[test]
    fn message_cites_cell() {
        let cell = Cell::new(3, 2, "3");
        let err = Error::data_structure("items", Some(&cell), "item after end of list");
        let text = err.to_string();
        assert!(text.contains("items"));
        assert!(text.contains("row=4,col=C"));
        assert_eq!(err.cell(), Some(&cell));
    }

    #[test]
    fn constraint_batch_message() {
        let err = Error::ConstraintViolation(vec![
            Violation {
                kind: ViolationKind::OutOfRange,
                scope: "items".to_string(),
                cell: None,
                message: "level 200 not in [1, 100]".to_string(),
            },
            Violation {
                kind: ViolationKind::MissingForeignTarget,
                scope: "items".to_string(),
                cell: None,
                message: "missing".to_string(),
            },
        ]);
        assert!(err.to_string().starts_with("2 constraint violation(s)"));
        assert_eq!(err.code(), DiagnosticCode::ConstraintViolation);
    }
}
