//! Bean definitions: the nodes of the schema tree

use configforge_core::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;
use crate::column::Column;
use crate::constraint::{ForeignKey, KeyRange};
use crate::own::OwnTags;
use crate::persist::{BeanDef, ColumnDef, ForeignKeyDef, KeyRangeDef};

/// What role a bean plays in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum BeanKind {
    /// Shared structure referenced by column types
    Normal,

    /// Row layout of a table
    TableRoot,

    /// Discriminated union; children are the variants, keyed by tag
    PolymorphicBase {
        enum_ref: String,
        children: IndexMap<String, Bean>,
    },

    /// One variant of a polymorphic base
    PolymorphicChild,
}

/// A schema node
#[derive(Debug, Clone, PartialEq)]
pub struct Bean {
    pub name: String,

    pub own: OwnTags,

    /// Separator when the whole bean is packed into one cell
    pub compress: Option<char>,

    pub columns: IndexMap<String, Column>,

    pub foreign_keys: IndexMap<String, ForeignKey>,

    pub ranges: IndexMap<String, KeyRange>,

    pub kind: BeanKind,
}

pub(crate) fn check_ident(scope: &str, what: &str, name: &str) -> Result<()> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));
    if re.is_match(name) {
        Ok(())
    } else {
        Err(Error::definition(scope, format!("invalid {} name '{}'", what, name)))
    }
}

impl Bean {
    /// Create an empty bean of the given kind
    pub fn new(name: impl Into<String>, kind: BeanKind) -> Self {
        Self {
            name: name.into(),
            own: OwnTags::default(),
            compress: None,
            columns: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            ranges: IndexMap::new(),
            kind,
        }
    }

    pub fn is_polymorphic_base(&self) -> bool {
        matches!(self.kind, BeanKind::PolymorphicBase { .. })
    }

    /// Children of a polymorphic base, empty otherwise
    pub fn children(&self) -> impl Iterator<Item = &Bean> {
        let children = match &self.kind {
            BeanKind::PolymorphicBase { children, .. } => Some(children.values()),
            _ => None,
        };
        children.into_iter().flatten()
    }

    /// Add a column, rejecting duplicates
    pub fn add_column(&mut self, scope: &str, column: Column) -> Result<()> {
        if self.is_polymorphic_base() {
            return Err(Error::definition(scope, "a polymorphic base may only declare child beans"));
        }
        if self.columns.contains_key(&column.name) {
            return Err(Error::definition(scope, format!("duplicate column '{}'", column.name)));
        }
        self.columns.insert(column.name.clone(), column);
        Ok(())
    }

    /// Build a shared (top-level) bean from its persisted form
    pub(crate) fn from_def(def: &BeanDef) -> Result<Self> {
        check_ident(&def.name, "bean", &def.name)?;
        let scope = def.name.as_str();

        match &def.enum_ref {
            Some(enum_ref) => {
                if !def.columns.is_empty() || !def.foreign_keys.is_empty() || !def.ranges.is_empty() {
                    return Err(Error::definition(
                        scope,
                        "a polymorphic base may only declare child beans",
                    ));
                }
                if def.compress.is_some() {
                    return Err(Error::definition(scope, "a polymorphic base may not be compressed"));
                }

                let mut children = IndexMap::new();
                for child_def in &def.children {
                    let child = Self::child_from_def(scope, child_def)?;
                    if children.contains_key(&child.name) {
                        return Err(Error::definition(
                            scope,
                            format!("duplicate child bean '{}'", child.name),
                        ));
                    }
                    children.insert(child.name.clone(), child);
                }

                let mut bean = Self::new(
                    def.name.clone(),
                    BeanKind::PolymorphicBase {
                        enum_ref: enum_ref.to_lowercase(),
                        children,
                    },
                );
                bean.own = OwnTags::parse(&def.own);
                Ok(bean)
            }
            None => {
                if !def.children.is_empty() {
                    return Err(Error::definition(
                        scope,
                        "only a bean with enum_ref may declare child beans",
                    ));
                }
                let mut bean = Self::new(def.name.clone(), BeanKind::Normal);
                bean.own = OwnTags::parse(&def.own);
                bean.compress = parse_separator(scope, def.compress.as_deref())?;
                bean.init(scope, &def.columns, &def.foreign_keys, &def.ranges)?;
                Ok(bean)
            }
        }
    }

    fn child_from_def(parent_scope: &str, def: &BeanDef) -> Result<Self> {
        check_ident(parent_scope, "child bean", &def.name)?;
        let scope = format!("{}.{}", parent_scope, def.name);
        if def.enum_ref.is_some() || !def.children.is_empty() {
            return Err(Error::definition(scope, "child may not have children"));
        }
        if def.compress.is_some() {
            return Err(Error::definition(scope, "a child bean may not be compressed"));
        }

        let mut bean = Self::new(def.name.clone(), BeanKind::PolymorphicChild);
        bean.own = OwnTags::parse(&def.own);
        bean.init(&scope, &def.columns, &def.foreign_keys, &def.ranges)?;
        Ok(bean)
    }

    /// Build the root bean of a table
    pub(crate) fn table_root_from_def(
        scope: &str,
        own: &str,
        columns: &[ColumnDef],
        foreign_keys: &[ForeignKeyDef],
        ranges: &[KeyRangeDef],
    ) -> Result<Self> {
        let mut bean = Self::new(scope.to_string(), BeanKind::TableRoot);
        bean.own = OwnTags::parse(own);
        bean.init(scope, columns, foreign_keys, ranges)?;
        Ok(bean)
    }

    fn init(
        &mut self,
        scope: &str,
        columns: &[ColumnDef],
        foreign_keys: &[ForeignKeyDef],
        ranges: &[KeyRangeDef],
    ) -> Result<()> {
        for def in columns {
            let column = Column::from_def(scope, def)?;
            self.add_column(scope, column)?;
        }

        for def in foreign_keys {
            let fk = ForeignKey::from_def(scope, def)?;
            if self.foreign_keys.contains_key(&fk.name) {
                return Err(Error::definition(scope, format!("duplicate foreign key '{}'", fk.name)));
            }
            self.foreign_keys.insert(fk.name.clone(), fk);
        }

        for def in ranges {
            let range = KeyRange::from_def(scope, def)?;
            if self.ranges.contains_key(&range.key) {
                return Err(Error::definition(scope, format!("duplicate key range '{}'", range.key)));
            }
            self.ranges.insert(range.key.clone(), range);
        }
        Ok(())
    }

    /// Check that constraints only name declared columns
    ///
    /// Run once columns are final (after resolution), since the resolver may
    /// add or drop columns.
    pub fn check_constraint_columns(&self, scope: &str) -> Result<()> {
        for fk in self.foreign_keys.values() {
            if let Some(missing) = fk.keys.iter().find(|k| !self.columns.contains_key(*k)) {
                return Err(Error::definition(
                    scope,
                    format!("foreign key '{}' names unknown column '{}'", fk.name, missing),
                ));
            }
        }
        for range in self.ranges.values() {
            if !self.columns.contains_key(&range.key) {
                return Err(Error::definition(
                    scope,
                    format!("key range names unknown column '{}'", range.key),
                ));
            }
        }
        for child in self.children() {
            child.check_constraint_columns(&format!("{}.{}", scope, child.name))?;
        }
        Ok(())
    }

    pub(crate) fn to_def(&self) -> BeanDef {
        let (enum_ref, children) = match &self.kind {
            BeanKind::PolymorphicBase { enum_ref, children } => (
                Some(enum_ref.clone()),
                children.values().map(Bean::to_def).collect(),
            ),
            _ => (None, Vec::new()),
        };

        BeanDef {
            name: self.name.clone(),
            own: self.own.to_attr(),
            compress: self.compress.map(|c| c.to_string()),
            enum_ref,
            columns: self.column_defs(),
            foreign_keys: self.foreign_keys.values().map(ForeignKey::to_def).collect(),
            ranges: self.ranges.values().map(KeyRange::to_def).collect(),
            children,
        }
    }

    pub(crate) fn column_defs(&self) -> Vec<ColumnDef> {
        self.columns.values().map(Column::to_def).collect()
    }
}

fn parse_separator(scope: &str, attr: Option<&str>) -> Result<Option<char>> {
    let Some(attr) = attr else {
        return Ok(None);
    };
    let mut chars = attr.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) => Ok(Some(sep)),
        _ => Err(Error::definition(
            scope,
            format!("compress separator must be exactly one character, got '{}'", attr),
        )),
    }
}
