//! Schema auto-completion against the discovered data
//!
//! Every raw table gets a definition: the authored one if it exists (or the
//! one behind a previously resolved type), else a fresh one. Columns are
//! reconciled with the header, untyped columns are inferred from the cells,
//! and the whole table is compiled once to validate the result. A failure
//! excludes only that table. Tables whose data disappeared are dropped.
//!
//! Running twice against the same data is a fixed point.

use configforge_core::{Cell, Diagnostic, DiagnosticCode, DiagnosticSink, Error, Location, Result, Severity};
use configforge_data::{DataDb, HeaderField, RawTable};
use configforge_define::{Column, Db, Table};
use indexmap::IndexMap;
use std::collections::HashSet;
use crate::compiler::{compile_table, Phase};
use crate::types::{resolve_beans, resolve_table, Scalar, TBean, TTable, TypeCatalog};

/// What changed during resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Tables with data but no prior definition
    pub discovered: Vec<String>,

    /// Tables with a definition but no data any more
    pub deleted: Vec<String>,

    /// Tables excluded because of table-local errors
    pub failed: Vec<String>,
}

/// Result of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    pub catalog: TypeCatalog,

    pub summary: ResolveSummary,
}

/// Complete `db` in place against `data`
///
/// `prior` holds types resolved by an earlier run; their definitions are
/// reused for tables missing from `db`. Definition errors abort; data and
/// inference errors exclude the table and go to `sink`.
pub fn auto_complete(
    db: &mut Db,
    prior: &TypeCatalog,
    data: &DataDb,
    header_rows: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<Resolution> {
    let beans = resolve_beans(db)?;
    let mut previous = std::mem::take(&mut db.tables);
    let mut summary = ResolveSummary::default();
    let mut tables = IndexMap::new();

    for raw in data.tables() {
        let name = raw.name.clone();
        let (define, is_new) = match previous.shift_remove(&name) {
            Some(table) => (table, false),
            None => match prior.table(&name) {
                Some(resolved) => (resolved.define.clone(), false),
                None => (Table::new(name.clone()), true),
            },
        };

        match complete_table(db, &beans, define, raw, header_rows, is_new) {
            Ok(resolved) => {
                if is_new {
                    tracing::info!(table = %name, "new table");
                    sink.push(
                        Diagnostic::new(
                            DiagnosticCode::SchemaTableDiscovered,
                            Severity::Info,
                            format!("new table {}", name),
                        )
                        .with_location(Location::new(&name)),
                    );
                    summary.discovered.push(name.clone());
                }
                db.add_table(resolved.define.clone())?;
                tables.insert(name, resolved);
            }
            Err(e) if e.is_table_local() => {
                tracing::warn!(table = %name, error = %e, "table excluded from resolution");
                sink.push(Diagnostic::from_error(&name, &e));
                summary.failed.push(name);
            }
            Err(e) => return Err(e),
        }
    }

    let mut deleted: Vec<String> = previous.into_keys().collect();
    for name in prior.tables.keys() {
        if data.get(name).is_none() && !deleted.contains(name) {
            deleted.push(name.clone());
        }
    }
    for name in &deleted {
        tracing::info!(table = %name, "delete table");
        sink.push(
            Diagnostic::new(
                DiagnosticCode::SchemaTableDeleted,
                Severity::Info,
                format!("delete table {}", name),
            )
            .with_location(Location::new(name)),
        );
    }
    summary.deleted = deleted;

    tracing::info!(
        tables = tables.len(),
        discovered = summary.discovered.len(),
        deleted = summary.deleted.len(),
        failed = summary.failed.len(),
        "schema resolved"
    );

    Ok(Resolution {
        catalog: TypeCatalog { beans, tables },
        summary,
    })
}

fn complete_table(
    db: &Db,
    beans: &IndexMap<String, TBean>,
    mut define: Table,
    raw: &RawTable,
    header_rows: usize,
    is_new: bool,
) -> Result<TTable> {
    let name = define.name.clone();
    let fields = raw
        .header_fields(header_rows)
        .map_err(|cell| Error::type_inference(&name, Some(&cell), "data under a column with no name"))?;
    if fields.is_empty() {
        return Err(Error::data_structure(&name, None, "header has no named columns"));
    }

    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            return Err(Error::data_structure(
                &name,
                Some(&header_cell(header_rows, field)),
                format!("duplicate column '{}'", field.name),
            ));
        }
    }

    let rows = raw.data_rows(header_rows, raw.width);
    let last = fields.len() - 1;
    let mut columns = IndexMap::new();
    for (i, field) in fields.iter().enumerate() {
        let mut column = define
            .bean
            .columns
            .shift_remove(&field.name)
            .unwrap_or_else(|| Column::new(field.name.clone()));
        if column.desc.is_empty() {
            column.desc = field.desc.clone();
        }
        if column.is_untyped() {
            let span = if i == last { used_span(field, &rows) } else { field.span };
            column.ty = infer_type(field.start, span, &rows);
            tracing::debug!(table = %name, column = %field.name, ty = %column.ty, "inferred column type");
        }
        columns.insert(field.name.clone(), column);
    }
    for dropped in define.bean.columns.keys() {
        tracing::info!(table = %name, column = %dropped, "column not in data, removed");
    }

    let bean = &mut define.bean;
    bean.columns = columns;
    let kept = &bean.columns;
    bean.foreign_keys.retain(|_, fk| {
        let keep = fk.keys.iter().all(|k| kept.contains_key(k));
        if !keep {
            tracing::warn!(table = %name, foreign_key = %fk.name, "foreign key names a removed column, dropped");
        }
        keep
    });
    bean.ranges.retain(|key, _| {
        let keep = kept.contains_key(key);
        if !keep {
            tracing::warn!(table = %name, key = %key, "range names a removed column, dropped");
        }
        keep
    });
    define
        .unique_keys
        .retain(|keys| keys.iter().all(|k| define.bean.columns.contains_key(k)));

    if is_new && define.primary_key.is_empty() {
        define.primary_key = vec![fields[0].name.clone()];
    }
    if let Some(missing) = define
        .primary_key
        .iter()
        .find(|k| !define.bean.columns.contains_key(*k))
    {
        return Err(Error::data_structure(
            &name,
            None,
            format!("primary key column '{}' is not in the data", missing),
        ));
    }

    // Shared beans are already resolved, so whatever fails here is confined
    // to this table's own columns
    let resolved = resolve_table(beans, db, &define).map_err(|e| match e {
        Error::Definition { scope, message } => Error::type_inference(&name, None, format!("{}: {}", scope, message)),
        other => other,
    })?;
    compile_table(beans, &resolved, raw, header_rows, Phase::Inference)?;
    Ok(resolved)
}

fn header_cell(header_rows: usize, field: &HeaderField) -> Cell {
    Cell::new(header_rows.saturating_sub(1), field.start, field.name.clone())
}

/// Span of the last field, shrunk to the last raw column holding data
fn used_span(field: &HeaderField, rows: &[Vec<Cell>]) -> usize {
    let used = (0..field.span)
        .rev()
        .find(|offset| {
            rows.iter()
                .any(|row| row.get(field.start + offset).is_some_and(|c| !c.is_empty()))
        })
        .map(|offset| offset + 1);
    used.unwrap_or(1)
}

/// Type text for a field of `span` raw columns
///
/// One column is a scalar; several are a column-span list of the kind that
/// accepts every cell. A column with no data is a string.
fn infer_type(start: usize, span: usize, rows: &[Vec<Cell>]) -> String {
    let texts = rows
        .iter()
        .flat_map(|row| row[start..start + span].iter().map(|c| c.data.as_str()));
    let scalar = Scalar::infer(texts).unwrap_or(Scalar::Str);
    if span == 1 {
        scalar.keyword().to_string()
    } else {
        format!("list<{},{}>", scalar, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configforge_data::RawTable;
    use pretty_assertions::assert_eq;

    fn data(tables: Vec<RawTable>) -> DataDb {
        DataDb::from_tables(tables).unwrap()
    }

    fn items() -> RawTable {
        RawTable::from_strs(
            "items",
            &[
                &["id", "name", "price", "drops", "", ""],
                &["id", "name", "price", "drops", "", ""],
                &["1", "sword", "10", "3", "4", ""],
                &["2", "axe", "12.5", "", "", ""],
            ],
        )
    }

    #[test]
    fn new_table_is_inferred() {
        let mut db = Db::new();
        let mut sink = Vec::new();
        let resolution =
            auto_complete(&mut db, &TypeCatalog::default(), &data(vec![items()]), 2, &mut sink).unwrap();

        assert_eq!(resolution.summary.discovered, vec!["items".to_string()]);
        let table = db.table("items").unwrap();
        let types: Vec<(&str, &str)> = table
            .bean
            .columns
            .values()
            .map(|c| (c.name.as_str(), c.ty.as_str()))
            .collect();
        assert_eq!(
            types,
            vec![("id", "int"), ("name", "string"), ("price", "float"), ("drops", "list<int,2>")]
        );
        assert_eq!(table.primary_key, vec!["id".to_string()]);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].code, DiagnosticCode::SchemaTableDiscovered);
    }

    #[test]
    fn authored_metadata_is_kept() {
        let mut db = Db::from_json(
            r#"{ "tables": [ { "name": "items", "own": "client", "columns": [
                { "name": "gone", "type": "int" },
                { "name": "name", "type": "text", "own": "client", "desc": "display name" }
            ] } ] }"#,
        )
        .unwrap();
        let mut sink = Vec::new();
        let resolution =
            auto_complete(&mut db, &TypeCatalog::default(), &data(vec![items()]), 2, &mut sink).unwrap();

        assert!(resolution.summary.discovered.is_empty());
        let table = db.table("items").unwrap();
        assert_eq!(
            table.bean.columns.keys().collect::<Vec<_>>(),
            vec!["id", "name", "price", "drops"]
        );
        let name = &table.bean.columns["name"];
        assert_eq!((name.ty.as_str(), name.desc.as_str()), ("text", "display name"));
        assert!(name.own.contains("client"));
    }

    #[test]
    fn bad_declared_type_excludes_only_that_table() {
        let mut db = Db::from_json(
            r#"{ "tables": [ { "name": "items", "columns": [ { "name": "name", "type": "int" } ] } ] }"#,
        )
        .unwrap();
        let shops = RawTable::from_strs("shops", &[&["id"], &["id"], &["7"]]);
        let mut sink = Vec::new();
        let resolution =
            auto_complete(&mut db, &TypeCatalog::default(), &data(vec![items(), shops]), 2, &mut sink)
                .unwrap();

        assert_eq!(resolution.summary.failed, vec!["items".to_string()]);
        assert!(db.table("items").is_none());
        assert!(db.table("shops").is_some());

        let failure = sink.iter().find(|d| d.code == DiagnosticCode::TypeInferenceError).unwrap();
        let location = failure.location.as_ref().unwrap();
        assert_eq!((location.row, location.column.as_deref()), (Some(3), Some("B")));
        assert!(failure.hint.as_deref().unwrap().contains("declare the column type"));
    }

    #[test]
    fn resolution_is_a_fixed_point() {
        let mut db = Db::new();
        let data = data(vec![items()]);
        auto_complete(&mut db, &TypeCatalog::default(), &data, 2, &mut Vec::new()).unwrap();
        let first = db.to_json();

        let mut reloaded = Db::from_json(&first).unwrap();
        let resolution =
            auto_complete(&mut reloaded, &TypeCatalog::default(), &data, 2, &mut Vec::new()).unwrap();
        assert_eq!(reloaded.to_json(), first);
        assert!(resolution.summary.discovered.is_empty());
    }

    #[test]
    fn prior_definition_is_reused() {
        let mut db = Db::new();
        let data = data(vec![items()]);
        let first = auto_complete(&mut db, &TypeCatalog::default(), &data, 2, &mut Vec::new()).unwrap();

        let mut empty = Db::new();
        let again = auto_complete(&mut empty, &first.catalog, &data, 2, &mut Vec::new()).unwrap();
        assert!(again.summary.discovered.is_empty());
        assert_eq!(empty.to_json(), db.to_json());
    }

    #[test]
    fn data_under_unnamed_column() {
        let raw = RawTable::from_strs("t", &[&["", "id"], &["", "id"], &["x", "1"]]);
        let mut sink = Vec::new();
        let resolution =
            auto_complete(&mut Db::new(), &TypeCatalog::default(), &data(vec![raw]), 2, &mut sink).unwrap();
        assert_eq!(resolution.summary.failed, vec!["t".to_string()]);
        assert_eq!(sink[0].code, DiagnosticCode::TypeInferenceError);
    }

    #[test]
    fn bad_column_type_excludes_only_that_table() {
        let shops = RawTable::from_strs("shops", &[&["id"], &["id"], &["7"]]);
        for ty in ["Missing", "list<int>"] {
            let mut db = Db::from_json(&format!(
                r#"{{ "tables": [ {{ "name": "items", "columns": [
                    {{ "name": "id", "type": "int" }}, {{ "name": "name", "type": "string" }},
                    {{ "name": "price", "type": "float" }}, {{ "name": "drops", "type": "{}" }} ] }} ] }}"#,
                ty
            ))
            .unwrap();
            let mut sink = Vec::new();
            let resolution = auto_complete(
                &mut db,
                &TypeCatalog::default(),
                &data(vec![items(), shops.clone()]),
                2,
                &mut sink,
            )
            .unwrap();

            assert_eq!(resolution.summary.failed, vec!["items".to_string()]);
            assert!(resolution.catalog.table("shops").is_some());
            assert!(resolution.catalog.table("items").is_none());
            let diag = sink
                .iter()
                .find(|d| d.code == DiagnosticCode::TypeInferenceError)
                .unwrap();
            assert_eq!(diag.location.as_ref().unwrap().scope, "items");
        }
    }

    #[test]
    fn bad_shared_bean_is_fatal() {
        let mut db = Db::from_json(
            r#"{ "beans": [ { "name": "Reward", "columns": [ { "name": "item", "type": "Missing" } ] } ],
                 "tables": [ { "name": "items", "columns": [ { "name": "id", "type": "int" } ] } ] }"#,
        )
        .unwrap();
        let err = auto_complete(&mut db, &TypeCatalog::default(), &data(vec![items()]), 2, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Definition { .. }));
    }
}
