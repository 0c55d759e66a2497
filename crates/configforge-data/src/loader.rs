//! Data discovery: walk the data root and build one raw table per file

use configforge_core::DataConfig;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use crate::error::DataError;
use crate::grid::{CsvGridParser, GridParser};
use crate::raw::RawTable;

/// Options controlling discovery and decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File extension without dot, matched case-insensitively
    pub extension: String,

    /// Encoding label
    pub encoding: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl From<&DataConfig> for LoadOptions {
    fn from(config: &DataConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            encoding: config.encoding.clone(),
        }
    }
}

/// Canonical table name for a data file
///
/// Path relative to the root, extension stripped, separators replaced by
/// `.`, lowercased. Returns `None` for files with another extension.
pub fn table_name(root: &Path, file: &Path, extension: &str) -> Option<String> {
    let ext = file.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case(extension) {
        return None;
    }

    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join(".").to_lowercase())
}

/// All raw tables of a run, keyed by canonical name
///
/// Built once and read-only afterwards. A missing name is not an error:
/// the resolver treats it as a deleted table.
#[derive(Debug, Clone, Default)]
pub struct DataDb {
    tables: BTreeMap<String, RawTable>,
    sources: BTreeMap<String, PathBuf>,
}

impl DataDb {
    /// Walk `root` and parse every data file with the CSV parser
    pub fn load(root: &Path, options: &LoadOptions) -> Result<Self, DataError> {
        Self::load_with(root, options, &CsvGridParser)
    }

    /// Walk `root` and parse every data file with `parser`
    pub fn load_with(
        root: &Path,
        options: &LoadOptions,
        parser: &dyn GridParser,
    ) -> Result<Self, DataError> {
        if !root.is_dir() {
            return Err(DataError::MissingDir(root.to_path_buf()));
        }

        let mut db = Self::default();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(name) = table_name(root, path, &options.extension) else {
                continue;
            };

            let bytes = std::fs::read(path).map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let rows = parser
                .parse(&bytes, &options.encoding)
                .map_err(|e| DataError::Parse {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?;

            tracing::debug!(table = %name, rows = rows.len(), path = %path.display(), "loaded data file");
            db.insert(RawTable::from_rows(name, rows), path.to_path_buf())?;
        }

        tracing::info!(tables = db.tables.len(), root = %root.display(), "data discovered");
        Ok(db)
    }

    /// Build from in-memory tables
    pub fn from_tables(tables: impl IntoIterator<Item = RawTable>) -> Result<Self, DataError> {
        let mut db = Self::default();
        for table in tables {
            let source = PathBuf::from(format!("<memory:{}>", table.name));
            db.insert(table, source)?;
        }
        Ok(db)
    }

    fn insert(&mut self, table: RawTable, source: PathBuf) -> Result<(), DataError> {
        if let Some(first) = self.sources.get(&table.name) {
            return Err(DataError::NameCollision {
                name: table.name.clone(),
                first: first.clone(),
                second: source,
            });
        }
        self.sources.insert(table.name.clone(), source);
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Look up a table by canonical name
    pub fn get(&self, name: &str) -> Option<&RawTable> {
        self.tables.get(name)
    }

    /// Tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &RawTable> {
        self.tables.values()
    }

    /// Source path a table was read from
    pub fn source(&self, name: &str) -> Option<&Path> {
        self.sources.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        let root = Path::new("/data");
        assert_eq!(
            table_name(root, Path::new("/data/Item/Weapon.CSV"), "csv"),
            Some("item.weapon".to_string())
        );
        assert_eq!(table_name(root, Path::new("/data/readme.txt"), "csv"), None);
    }

    #[test]
    fn in_memory_collision() {
        let err = DataDb::from_tables(vec![
            RawTable::from_strs("items", &[&["id"]]),
            RawTable::from_strs("items", &[&["id"]]),
        ])
        .unwrap_err();
        assert!(matches!(err, DataError::NameCollision { .. }));
    }

    #[test]
    fn missing_name_is_none() {
        let db = DataDb::from_tables(vec![RawTable::from_strs("items", &[&["id"]])]).unwrap();
        assert!(db.get("items").is_some());
        assert!(db.get("shops").is_none());
    }
}
