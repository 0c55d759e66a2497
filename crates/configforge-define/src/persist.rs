//! Persisted (JSON) form of the schema definition
//!
//! These are plain serde records. Validation happens when they are turned
//! into the in-memory tree by [`crate::Db::from_def`].

use serde::{Deserialize, Serialize};

/// Whole definition file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbDef {
    /// Shared beans
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beans: Vec<BeanDef>,

    /// Tables, one per data file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableDef>,
}

/// Bean declaration; `enum_ref` makes it a polymorphic base with `children`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub own: String,

    /// Single separator character packing the bean into one cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<KeyRangeDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BeanDef>,
}

/// Table declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub own: String,

    /// Empty means the first column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_keys: Vec<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<KeyRangeDef>,
}

/// Column declaration; an empty type is filled in by the resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,

    #[serde(rename = "type", default)]
    pub ty: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub own: String,

    /// `"asone"` or a single separator character
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
}

/// Foreign key declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    pub name: String,

    pub keys: Vec<String>,

    #[serde(rename = "ref")]
    pub target: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,

    /// Target columns matched instead of the target's primary key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<Vec<String>>,
}

/// Range or enum constraint on one column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRangeDef {
    pub key: String,

    /// `"min,max"` or `"a|b|c"`
    pub range: String,
}
