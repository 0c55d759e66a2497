//! Column definitions

use configforge_core::{Error, Result};
use crate::own::OwnTags;
use crate::persist::ColumnDef;
use crate::type_expr::TypeExpr;

/// Per-column list/bean packing override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColumnCompress {
    /// Column-span layout
    #[default]
    None,

    /// Whole value in one cell, parsed with the nested-list grammar
    AsOne,

    /// Whole value in one cell, split by a single separator (legacy)
    Separator(char),
}

impl ColumnCompress {
    /// Parse the persisted attribute
    pub fn parse(scope: &str, attr: Option<&str>) -> Result<Self> {
        match attr {
            None => Ok(Self::None),
            Some(a) if a.eq_ignore_ascii_case("asone") => Ok(Self::AsOne),
            Some(a) => {
                let mut chars = a.chars();
                match (chars.next(), chars.next()) {
                    (Some(sep), None) => Ok(Self::Separator(sep)),
                    _ => Err(Error::definition(
                        scope,
                        format!("compress must be 'asone' or a single character, got '{}'", a),
                    )),
                }
            }
        }
    }

    pub fn to_attr(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::AsOne => Some("asone".to_string()),
            Self::Separator(sep) => Some(sep.to_string()),
        }
    }
}

/// One column of a bean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,

    /// Type expression text; empty until declared or inferred
    pub ty: String,

    pub own: OwnTags,

    pub compress: ColumnCompress,

    pub desc: String,
}

impl Column {
    /// Create an untyped column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: String::new(),
            own: OwnTags::default(),
            compress: ColumnCompress::None,
            desc: String::new(),
        }
    }

    /// Set the type expression
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = ty.into();
        self
    }

    /// Set own tags
    pub fn with_own(mut self, own: OwnTags) -> Self {
        self.own = own;
        self
    }

    /// Set compression
    pub fn with_compress(mut self, compress: ColumnCompress) -> Self {
        self.compress = compress;
        self
    }

    pub(crate) fn from_def(scope: &str, def: &ColumnDef) -> Result<Self> {
        crate::bean::check_ident(scope, "column", &def.name)?;
        let col_scope = format!("{}.{}", scope, def.name);
        if !def.ty.is_empty() {
            TypeExpr::parse(&def.ty).map_err(|e| Error::definition(&col_scope, e))?;
        }

        Ok(Self {
            name: def.name.clone(),
            ty: def.ty.clone(),
            own: OwnTags::parse(&def.own),
            compress: ColumnCompress::parse(&col_scope, def.compress.as_deref())?,
            desc: def.desc.clone(),
        })
    }

    pub(crate) fn to_def(&self) -> ColumnDef {
        ColumnDef {
            name: self.name.clone(),
            ty: self.ty.clone(),
            own: self.own.to_attr(),
            compress: self.compress.to_attr(),
            desc: self.desc.clone(),
        }
    }

    /// Whether the type still has to be inferred
    pub fn is_untyped(&self) -> bool {
        self.ty.trim().is_empty()
    }

    /// Parsed type expression, if declared
    pub fn type_expr(&self) -> Option<TypeExpr> {
        TypeExpr::parse(&self.ty).ok()
    }
}
