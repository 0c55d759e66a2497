//! Constraint verification over every compiled table
//!
//! Runs only once all tables are compiled, since foreign keys may point at
//! any table. All violations are collected and returned together.

use configforge_core::{Cell, Error, Result, Violation, ViolationKind};
use configforge_define::{ForeignKey, KeyRange, RangeExpr};
use std::collections::{HashMap, HashSet};
use crate::compiler::{key_of, lookup_key, CompiledDb, CompiledTable};
use crate::types::{ResolvedType, TBean, TTable, TypeCatalog, TypeKind};
use crate::value::{Value, ValueKind};

/// Check keys, foreign keys and ranges of every compiled table
pub fn verify_constraints(catalog: &TypeCatalog, compiled: &CompiledDb) -> Result<()> {
    let mut verifier = Verifier {
        catalog,
        compiled,
        indexes: HashMap::new(),
        missing_targets: HashSet::new(),
        violations: Vec::new(),
    };

    for (name, table) in &compiled.tables {
        let Some(resolved) = catalog.table(name) else {
            continue;
        };
        verifier.check_keys(resolved, table);
        for row in &table.rows {
            verifier.check_bean(name, &resolved.root, row);
        }
    }

    if verifier.violations.is_empty() {
        tracing::debug!(tables = compiled.tables.len(), "constraints verified");
        Ok(())
    } else {
        tracing::warn!(count = verifier.violations.len(), "constraint violations found");
        Err(Error::ConstraintViolation(verifier.violations))
    }
}

struct Verifier<'a> {
    catalog: &'a TypeCatalog,
    compiled: &'a CompiledDb,
    /// Lookup sets for foreign keys that match non-primary-key columns
    indexes: HashMap<(String, Vec<String>), HashSet<Vec<Value>>>,
    /// Foreign keys already reported for a missing target table
    missing_targets: HashSet<(String, String)>,
    violations: Vec<Violation>,
}

impl<'a> Verifier<'a> {
    fn push(&mut self, kind: ViolationKind, scope: &str, cell: Option<&Cell>, message: String) {
        self.violations.push(Violation {
            kind,
            scope: scope.to_string(),
            cell: cell.cloned(),
            message,
        });
    }

    fn check_keys(&mut self, resolved: &TTable, table: &CompiledTable) {
        let mut keys = vec![(ViolationKind::DuplicatePrimaryKey, "primary key", &resolved.primary_key)];
        for unique in &resolved.define.unique_keys {
            keys.push((ViolationKind::DuplicateUniqueKey, "unique key", unique));
        }

        for (kind, label, columns) in keys {
            if columns.is_empty() {
                continue;
            }
            let mut seen: HashMap<Vec<Value>, usize> = HashMap::new();
            for (i, row) in table.rows.iter().enumerate() {
                let Some(key) = key_of(row, columns) else {
                    continue;
                };
                match seen.get(&key) {
                    Some(&first) => {
                        let first_row = table.rows[first].first_origin().map(|c| c.row + 1);
                        let message = format!(
                            "duplicate {} ({}) = ({}), first used in row {}",
                            label,
                            columns.join(","),
                            fmt_key(&key),
                            first_row.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string())
                        );
                        let cell = key[0].first_origin().cloned();
                        self.push(kind, &table.name, cell.as_ref(), message);
                    }
                    None => {
                        seen.insert(key, i);
                    }
                }
            }
        }
    }

    fn check_bean(&mut self, scope: &str, bean: &'a TBean, value: &Value) {
        let ValueKind::Bean { variant, fields, .. } = &value.kind else {
            return;
        };
        let (layout, scope) = match variant {
            Some(v) => match bean.variants.get(v) {
                Some(child) => (child, format!("{}.{}", scope, v)),
                None => return,
            },
            None => (bean, scope.to_string()),
        };

        for range in &layout.ranges {
            if let Some(v) = value.field(&range.key) {
                self.check_range(&scope, range, v);
            }
        }
        for fk in &layout.foreign_keys {
            self.check_foreign_key(&scope, fk, value);
        }
        for (name, v) in fields {
            if let Some(ty) = layout.fields.get(name) {
                self.check_nested(ty, v);
            }
        }
    }

    fn check_nested(&mut self, ty: &'a ResolvedType, value: &Value) {
        let catalog = self.catalog;
        match (&ty.kind, &value.kind) {
            (TypeKind::Bean(name), _) => {
                if let Some(bean) = catalog.bean(name) {
                    self.check_bean(name, bean, value);
                }
            }
            (TypeKind::List { item, .. }, ValueKind::List(items)) => {
                for v in items {
                    self.check_nested(item, v);
                }
            }
            _ => {}
        }
    }

    fn check_range(&mut self, scope: &str, range: &KeyRange, value: &Value) {
        let ok = match &value.kind {
            ValueKind::List(items) => {
                for item in items {
                    self.check_range(scope, range, item);
                }
                return;
            }
            ValueKind::Int(_) | ValueKind::Long(_) | ValueKind::Float(_) => match value.as_f64() {
                Some(n) => range.constraint.contains_number(n),
                None => true,
            },
            ValueKind::Str(s) | ValueKind::Text(s) => range.constraint.contains_text(s),
            ValueKind::Bool(b) => match &range.constraint {
                RangeExpr::OneOf(_) => range.constraint.contains_text(if *b { "true" } else { "false" }),
                RangeExpr::Between(..) => true,
            },
            ValueKind::Bean { .. } => true,
        };
        if !ok {
            let message = format!("{} = {} is not in {}", range.key, value, range.constraint);
            self.push(ViolationKind::OutOfRange, scope, value.origin.as_ref(), message);
        }
    }

    fn check_foreign_key(&mut self, scope: &str, fk: &ForeignKey, row: &Value) {
        let Some(local) = key_of(row, &fk.keys) else {
            return;
        };
        // A single list-typed key checks every element
        let elements = match local.as_slice() {
            [Value { kind: ValueKind::List(items), .. }] => Some(items.clone()),
            _ => None,
        };
        let candidates: Vec<Vec<Value>> = match elements {
            Some(items) => items.into_iter().map(|i| vec![i]).collect(),
            None => vec![local],
        };
        let candidates: Vec<Vec<Value>> = candidates
            .into_iter()
            .filter(|key| !(fk.nullable && key.iter().all(Value::is_zero)))
            .collect();
        if candidates.is_empty() {
            return;
        }

        let compiled = self.compiled;
        let Some(target) = compiled.table(&fk.target) else {
            if self.missing_targets.insert((scope.to_string(), fk.name.clone())) {
                let message = format!("{} targets table '{}' which has no compiled rows", fk.name, fk.target);
                self.push(ViolationKind::MissingForeignTarget, scope, None, message);
            }
            return;
        };

        for key in candidates {
            let found = match &fk.key_ref {
                None => target.find(&key).is_some(),
                Some(columns) => self.index(target, columns).contains(&lookup_key(&key)),
            };
            if !found {
                let columns = fk.key_ref.as_ref().unwrap_or(&target.primary_key);
                let message = format!(
                    "{}: no row in {} with ({}) = ({})",
                    fk.name,
                    fk.target,
                    columns.join(","),
                    fmt_key(&key)
                );
                let cell = key.first().and_then(Value::first_origin).cloned();
                self.push(ViolationKind::MissingForeignTarget, scope, cell.as_ref(), message);
            }
        }
    }

    fn index(&mut self, table: &CompiledTable, columns: &[String]) -> &HashSet<Vec<Value>> {
        self.indexes
            .entry((table.name.clone(), columns.to_vec()))
            .or_insert_with(|| {
                table
                    .rows
                    .iter()
                    .filter_map(|r| key_of(r, columns))
                    .map(|k| lookup_key(&k))
                    .collect()
            })
    }
}

fn fmt_key(key: &[Value]) -> String {
    key.iter().map(Value::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_all;
    use configforge_core::Diagnostic;
    use configforge_data::{DataDb, RawTable};
    use configforge_define::Db;

    const DEFINE: &str = r#"{
  "beans": [
    { "name": "Drop", "columns": [
      { "name": "item", "type": "int" },
      { "name": "count", "type": "int" } ],
      "foreign_keys": [ { "name": "drop_item", "keys": ["item"], "ref": "items" } ],
      "ranges": [ { "key": "count", "range": "1,99" } ] }
  ],
  "tables": [
    { "name": "items", "primary_key": ["id"], "unique_keys": [["code"]], "columns": [
      { "name": "id", "type": "int" },
      { "name": "code", "type": "string" },
      { "name": "element", "type": "string" } ],
      "ranges": [ { "key": "element", "range": "fire|ice" } ] },
    { "name": "monsters", "primary_key": ["id"], "columns": [
      { "name": "id", "type": "int" },
      { "name": "weapon", "type": "int" },
      { "name": "armor_code", "type": "string" },
      { "name": "friends", "type": "list<int>", "compress": ";" },
      { "name": "drops", "type": "list<Drop,2>" } ],
      "foreign_keys": [
        { "name": "weapon_fk", "keys": ["weapon"], "ref": "items", "nullable": true },
        { "name": "armor_fk", "keys": ["armor_code"], "ref": "items", "key_ref": ["code"] },
        { "name": "friend_fk", "keys": ["friends"], "ref": "monsters" } ] }
  ]
}"#;

    fn run(items: &[&[&str]], monsters: &[&[&str]]) -> (Vec<Diagnostic>, Result<()>) {
        let db = Db::from_json(DEFINE).unwrap();
        let catalog = TypeCatalog::resolve(&db).unwrap();
        let data = DataDb::from_tables(vec![
            RawTable::from_strs("items", items),
            RawTable::from_strs("monsters", monsters),
        ])
        .unwrap();
        let mut sink = Vec::new();
        let compiled = compile_all(&catalog, &data, 1, &mut sink).unwrap();
        let result = verify_constraints(&catalog, &compiled);
        (sink, result)
    }

    const ITEMS: &[&[&str]] = &[
        &["id", "code", "element"],
        &["1", "sword", "fire"],
        &["2", "shield", "ice"],
    ];

    const MONSTER_HEADER: &[&str] = &["id", "weapon", "armor_code", "friends", "drops", "", "", ""];

    #[test]
    fn consistent_data_passes() {
        let (sink, result) = run(
            ITEMS,
            &[
                MONSTER_HEADER,
                &["10", "1", "shield", "11", "1", "5", "2", "1"],
                &["11", "0", "sword", "10;11", "", "", "", ""],
            ],
        );
        assert!(sink.is_empty());
        result.unwrap();
    }

    #[test]
    fn violations_are_collected() {
        let (_, result) = run(
            &[
                &["id", "code", "element"],
                &["1", "sword", "fire"],
                &["1", "sword", "wind"],
            ],
            &[
                MONSTER_HEADER,
                &["10", "3", "boots", "10;12", "1", "500", "", ""],
            ],
        );
        let violations = match result {
            Err(Error::ConstraintViolation(v)) => v,
            other => panic!("expected violations, got {:?}", other),
        };
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();

        assert_eq!(kinds.iter().filter(|k| **k == ViolationKind::DuplicatePrimaryKey).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == ViolationKind::DuplicateUniqueKey).count(), 1);
        // element "wind" and drop count 500
        assert_eq!(kinds.iter().filter(|k| **k == ViolationKind::OutOfRange).count(), 2);
        // weapon 3, armor "boots", friend 12
        assert_eq!(kinds.iter().filter(|k| **k == ViolationKind::MissingForeignTarget).count(), 3);

        let friend = violations.iter().find(|v| v.message.starts_with("friend_fk")).unwrap();
        assert_eq!(friend.scope, "monsters");
        let range = violations.iter().find(|v| v.scope == "Drop").unwrap();
        assert_eq!(range.cell.as_ref().unwrap().data, "500");
    }

    #[test]
    fn missing_target_table_reported_once() {
        let db = Db::from_json(DEFINE).unwrap();
        let catalog = TypeCatalog::resolve(&db).unwrap();
        let data = DataDb::from_tables(vec![RawTable::from_strs(
            "monsters",
            &[
                MONSTER_HEADER,
                &["10", "0", "a", "", "", "", "", ""],
                &["11", "0", "b", "", "", "", "", ""],
            ],
        )])
        .unwrap();
        let mut sink = Vec::new();
        let compiled = compile_all(&catalog, &data, 1, &mut sink).unwrap();
        assert_eq!(compiled.excluded, vec!["items".to_string()]);

        let violations = match verify_constraints(&catalog, &compiled) {
            Err(Error::ConstraintViolation(v)) => v,
            other => panic!("expected violations, got {:?}", other),
        };
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("armor_fk"));
    }

    #[test]
    fn int_key_references_long_key() {
        let db = Db::from_json(
            r#"{ "tables": [
                { "name": "items", "columns": [ { "name": "id", "type": "long" }, { "name": "code", "type": "string" } ] },
                { "name": "shops", "columns": [ { "name": "id", "type": "int" }, { "name": "item", "type": "int" },
                                                { "name": "code", "type": "int" } ],
                  "foreign_keys": [
                    { "name": "item_fk", "keys": ["item"], "ref": "items" },
                    { "name": "id_fk", "keys": ["code"], "ref": "items", "key_ref": ["id"] } ] }
            ] }"#,
        )
        .unwrap();
        let catalog = TypeCatalog::resolve(&db).unwrap();
        let data = DataDb::from_tables(vec![
            RawTable::from_strs("items", &[&["id", "code"], &["1", "sword"], &["9000000000", "axe"]]),
            RawTable::from_strs("shops", &[&["id", "item", "code"], &["7", "1", "1"]]),
        ])
        .unwrap();
        let compiled = compile_all(&catalog, &data, 1, &mut Vec::new()).unwrap();

        verify_constraints(&catalog, &compiled).unwrap();
        let items = compiled.table("items").unwrap();
        assert!(items.find(&[Value::new(ValueKind::Int(1), None)]).is_some());
    }
}
