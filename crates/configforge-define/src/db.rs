//! The whole schema definition: shared beans plus tables

use configforge_core::{Error, Result};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::path::Path;
use crate::bean::Bean;
use crate::persist::DbDef;
use crate::table::Table;

/// Schema definition tree
///
/// Built from the persisted form, completed in place by the resolver, then
/// treated as frozen while values are compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Db {
    pub beans: IndexMap<String, Bean>,

    pub tables: IndexMap<String, Table>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate the tree from its persisted form
    pub fn from_def(def: &DbDef) -> Result<Self> {
        let mut db = Self::new();

        for bean_def in &def.beans {
            let bean = Bean::from_def(bean_def)?;
            bean.check_constraint_columns(&bean.name)?;
            db.add_bean(bean)?;
        }

        for table_def in &def.tables {
            let table = Table::from_def(table_def)?;
            db.add_table(table)?;
        }

        Ok(db)
    }

    /// Persisted form, in insertion order
    pub fn to_def(&self) -> DbDef {
        DbDef {
            beans: self.beans.values().map(Bean::to_def).collect(),
            tables: self.tables.values().map(Table::to_def).collect(),
        }
    }

    /// Parse a JSON definition
    pub fn from_json(json: &str) -> Result<Self> {
        let def: DbDef = serde_json::from_str(json)
            .map_err(|e| Error::definition("<define>", format!("invalid definition JSON: {}", e)))?;
        Self::from_def(&def)
    }

    /// Pretty JSON with a trailing newline
    pub fn to_json(&self) -> String {
        // DbDef holds only strings, vectors and bools
        let mut json = serde_json::to_string_pretty(&self.to_def()).unwrap_or_default();
        json.push('\n');
        json
    }

    /// Load from a definition file; a missing file yields an empty definition
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "definition file not found, starting empty");
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&contents)
    }

    /// Write the definition file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()).map_err(|e| Error::io(path, e))
    }

    /// SHA-256 of the persisted form
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.to_json().as_bytes()))
    }

    /// Add a shared bean, rejecting name clashes with beans and tables
    pub fn add_bean(&mut self, bean: Bean) -> Result<()> {
        if self.beans.contains_key(&bean.name) {
            return Err(Error::definition(&bean.name, "duplicate bean name"));
        }
        if self.tables.contains_key(&bean.name.to_lowercase()) {
            return Err(Error::definition(&bean.name, "bean name collides with a table"));
        }
        self.beans.insert(bean.name.clone(), bean);
        Ok(())
    }

    /// Add a table, rejecting name clashes with tables and beans
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            return Err(Error::definition(&table.name, "duplicate table name"));
        }
        if self.beans.keys().any(|b| b.to_lowercase() == table.name) {
            return Err(Error::definition(&table.name, "table name collides with a bean"));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Create and register an empty table
    pub fn new_table(&mut self, name: &str) -> Result<&mut Table> {
        self.add_table(Table::new(name))?;
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::definition(name, "table vanished after insert"))
    }

    pub fn bean(&self, name: &str) -> Option<&Bean> {
        self.beans.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
  "beans": [
    {
      "name": "Reward",
      "columns": [
        { "name": "item", "type": "int" },
        { "name": "count", "type": "int" }
      ],
      "ranges": [ { "key": "count", "range": "1,99" } ]
    }
  ],
  "tables": [
    {
      "name": "items",
      "columns": [
        { "name": "id", "type": "int" },
        { "name": "rewards", "type": "list<Reward,2>" }
      ]
    }
  ]
}
"#;

    #[test]
    fn json_round_trip_is_stable() {
        let db = Db::from_json(SAMPLE).unwrap();
        let saved = db.to_json();
        let reloaded = Db::from_json(&saved).unwrap();
        assert_eq!(db, reloaded);
        assert_eq!(saved, reloaded.to_json());
        assert_eq!(db.fingerprint(), reloaded.fingerprint());
    }

    #[test]
    fn duplicate_table_is_fatal() {
        let json = r#"{ "tables": [ { "name": "items" }, { "name": "Items" } ] }"#;
        let err = Db::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Definition { .. }));
    }

    #[test]
    fn bean_table_collision() {
        let json = r#"{ "beans": [ { "name": "Items" } ], "tables": [ { "name": "items" } ] }"#;
        assert!(Db::from_json(json).is_err());
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let mut db = Db::from_json(SAMPLE).unwrap();
        let before = db.fingerprint();
        db.new_table("shops").unwrap();
        assert_ne!(before, db.fingerprint());
    }

    #[test]
    fn missing_file_is_empty() {
        let db = Db::from_file(Path::new("/nonexistent/configforge/define.json")).unwrap();
        assert!(db.tables.is_empty());
    }
}
