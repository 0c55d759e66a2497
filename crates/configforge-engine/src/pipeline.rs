//! The whole run: resolve, compile, then verify

use configforge_core::{DataConfig, Diagnostic, DiagnosticSink, Error, Result};
use configforge_data::DataDb;
use configforge_define::Db;
use crate::compiler::{compile_all, CompiledDb};
use crate::constraint::verify_constraints;
use crate::resolver::{auto_complete, Resolution, ResolveSummary};
use crate::types::TypeCatalog;

/// Everything a code generator needs from one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub catalog: TypeCatalog,

    pub compiled: CompiledDb,

    pub summary: ResolveSummary,
}

/// Runs the phases in order
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    header_rows: usize,
}

impl Pipeline {
    pub fn new(header_rows: usize) -> Self {
        Self { header_rows }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.header_rows)
    }

    /// Complete `db` against `data`, compile every table and verify
    /// constraints
    ///
    /// Violations are pushed to `sink` one by one and returned as a batch.
    pub fn run(
        &self,
        db: &mut Db,
        prior: &TypeCatalog,
        data: &DataDb,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<PipelineOutput> {
        let Resolution { catalog, summary } = auto_complete(db, prior, data, self.header_rows, sink)?;
        let compiled = self.compile_and_verify(&catalog, data, sink)?;
        Ok(PipelineOutput {
            catalog,
            compiled,
            summary,
        })
    }

    /// Compile and verify a complete definition as is, without completing it
    pub fn check(
        &self,
        db: &Db,
        data: &DataDb,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(TypeCatalog, CompiledDb)> {
        let catalog = TypeCatalog::resolve(db)?;
        let compiled = self.compile_and_verify(&catalog, data, sink)?;
        Ok((catalog, compiled))
    }

    fn compile_and_verify(
        &self,
        catalog: &TypeCatalog,
        data: &DataDb,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<CompiledDb> {
        // compile_all returns only after every table is compiled, so foreign
        // keys see all targets
        let compiled = compile_all(catalog, data, self.header_rows, sink)?;
        if let Err(err) = verify_constraints(catalog, &compiled) {
            if let Error::ConstraintViolation(violations) = &err {
                for violation in violations {
                    sink.push(Diagnostic::from(violation));
                }
            }
            return Err(err);
        }
        Ok(compiled)
    }
}
