//! Table definitions

use configforge_core::{Error, Result};
use crate::bean::{Bean, BeanKind};
use crate::persist::TableDef;

/// A table: one data file, rows laid out by its root bean
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Lowercased dotted name derived from the data file path
    pub name: String,

    /// Primary key columns; empty means the first column
    pub primary_key: Vec<String>,

    pub unique_keys: Vec<Vec<String>>,

    /// Row layout
    pub bean: Bean,
}

impl Table {
    /// Create an empty table (no columns yet)
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            bean: Bean::new(name.clone(), BeanKind::TableRoot),
            name,
            primary_key: Vec::new(),
            unique_keys: Vec::new(),
        }
    }

    pub(crate) fn from_def(def: &TableDef) -> Result<Self> {
        let name = def.name.to_lowercase();
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(Error::definition(&def.name, "invalid table name"));
        }

        let bean = Bean::table_root_from_def(
            &name,
            &def.own,
            &def.columns,
            &def.foreign_keys,
            &def.ranges,
        )?;

        Ok(Self {
            name,
            primary_key: def.primary_key.clone(),
            unique_keys: def.unique_keys.clone(),
            bean,
        })
    }

    pub(crate) fn to_def(&self) -> TableDef {
        TableDef {
            name: self.name.clone(),
            own: self.bean.own.to_attr(),
            primary_key: self.primary_key.clone(),
            unique_keys: self.unique_keys.clone(),
            columns: self.bean.column_defs(),
            foreign_keys: self.bean.foreign_keys.values().map(|fk| fk.to_def()).collect(),
            ranges: self.bean.ranges.values().map(|r| r.to_def()).collect(),
        }
    }

    /// Effective primary key columns
    pub fn primary_key_columns(&self) -> Vec<String> {
        if !self.primary_key.is_empty() {
            return self.primary_key.clone();
        }
        self.bean
            .columns
            .keys()
            .next()
            .map(|first| vec![first.clone()])
            .unwrap_or_default()
    }

    /// Check that key and constraint columns exist
    pub fn check_columns(&self) -> Result<()> {
        for key in self.primary_key.iter().chain(self.unique_keys.iter().flatten()) {
            if !self.bean.columns.contains_key(key) {
                return Err(Error::definition(
                    &self.name,
                    format!("key names unknown column '{}'", key),
                ));
            }
        }
        self.bean.check_constraint_columns(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::ColumnDef;

    #[test]
    fn name_is_lowercased() {
        let def = TableDef {
            name: "Item.Weapon".to_string(),
            ..Default::default()
        };
        let table = Table::from_def(&def).unwrap();
        assert_eq!(table.name, "item.weapon");
        assert_eq!(table.bean.kind, BeanKind::TableRoot);
    }

    #[test]
    fn default_primary_key_is_first_column() {
        let def = TableDef {
            name: "items".to_string(),
            columns: vec![
                ColumnDef { name: "id".into(), ty: "int".into(), ..Default::default() },
                ColumnDef { name: "name".into(), ty: "string".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        let table = Table::from_def(&def).unwrap();
        assert_eq!(table.primary_key_columns(), vec!["id".to_string()]);
        assert!(Table::new("empty").primary_key_columns().is_empty());
    }

    #[test]
    fn unknown_key_column() {
        let def = TableDef {
            name: "items".to_string(),
            primary_key: vec!["missing".into()],
            ..Default::default()
        };
        let table = Table::from_def(&def).unwrap();
        assert!(table.check_columns().is_err());
    }
}
