//! Schema definition tree
//!
//! This crate handles:
//! - The bean / table / column / foreign key / range model
//! - Loading and saving the persisted JSON definition
//! - Own-tag extraction of per-consumer views

pub mod bean;
pub mod column;
pub mod constraint;
pub mod db;
pub mod extract;
pub mod own;
pub mod persist;
pub mod table;
pub mod type_expr;

pub use bean::{Bean, BeanKind};
pub use column::{Column, ColumnCompress};
pub use constraint::{ForeignKey, KeyRange, RangeExpr};
pub use db::Db;
pub use own::OwnTags;
pub use persist::{BeanDef, ColumnDef, DbDef, ForeignKeyDef, KeyRangeDef, TableDef};
pub use table::Table;
pub use type_expr::TypeExpr;
