//! configforge engine
//!
//! This crate handles:
//! - Binding the schema into resolved types with cell spans
//! - Completing the schema against discovered data
//! - Compiling cells into typed values
//! - Verifying keys, foreign keys and ranges across tables

pub mod compiler;
pub mod constraint;
pub mod nest;
pub mod pipeline;
pub mod resolver;
pub mod types;
pub mod value;

pub use compiler::{compile_all, compile_table, CompiledDb, CompiledTable, Compiler, Phase};
pub use constraint::verify_constraints;
pub use pipeline::{Pipeline, PipelineOutput};
pub use resolver::{auto_complete, Resolution, ResolveSummary};
pub use types::{Compress, ResolvedType, Scalar, TBean, TTable, TypeCatalog, TypeKind};
pub use value::{Value, ValueKind};
