//! Value compiler: cells plus resolved types to values
//!
//! Three list encodings are supported:
//! - AsOne: one cell, nested-list grammar, inherited by every nested list
//! - Separator: one cell split by a single character
//! - Column-span: the item span repeated `count` times
//!
//! Separator and column-span lists are read in stride groups of one item
//! span each. The first group whose leading cell is empty ends the list,
//! and every cell after it must be empty as well.

use configforge_core::{Cell, Diagnostic, DiagnosticCode, DiagnosticSink, Error, Location, Result, Severity};
use configforge_data::{DataDb, HeaderField, RawTable};
use indexmap::IndexMap;
use std::collections::HashMap;
use crate::nest::{self, Node};
use crate::types::{Compress, ResolvedType, Scalar, TBean, TTable, TypeCatalog, TypeKind};
use crate::value::{Value, ValueKind};

/// Which pass is compiling
///
/// Decides how an unparseable scalar is reported: while completing the
/// schema it is a type inference problem, afterwards a data problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Inference,
    Compile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListState {
    ExpectItemOrEnd,
    Terminated,
}

/// Compiles cells of one table
pub struct Compiler<'a> {
    beans: &'a IndexMap<String, TBean>,
    phase: Phase,
    scope: String,
}

impl<'a> Compiler<'a> {
    pub fn new(beans: &'a IndexMap<String, TBean>, phase: Phase, scope: impl Into<String>) -> Self {
        Self {
            beans,
            phase,
            scope: scope.into(),
        }
    }

    /// Compile the cells of one field slot
    ///
    /// `as_one` forces the nested-list grammar on this value and everything
    /// beneath it.
    pub fn compile(&self, cells: &[Cell], ty: &ResolvedType, as_one: bool) -> Result<Value> {
        let as_one = as_one || ty.compress == Compress::AsOne;
        match &ty.kind {
            TypeKind::Scalar(scalar) => {
                let cell = self.single(cells)?;
                self.scalar(cell, *scalar)
            }
            _ if as_one => {
                let cell = self.single(cells)?;
                let items = nest::decode(&cell.data).map_err(|e| self.structure(Some(cell), e))?;
                self.compile_node(Node::Group(items), ty, cell)
            }
            TypeKind::Bean(name) => {
                let bean = self.bean(name)?;
                let separator = match ty.compress {
                    Compress::Separator(sep) => Some(sep),
                    _ => bean.packed,
                };
                match separator {
                    Some(sep) => {
                        let cell = self.single(cells)?;
                        self.compile_bean(&split(cell, sep), bean)
                    }
                    None => {
                        self.expect_span(cells, ty.span)?;
                        self.compile_bean(cells, bean)
                    }
                }
            }
            TypeKind::List { item, .. } => {
                let items = match ty.compress {
                    Compress::Separator(sep) => {
                        let cell = self.single(cells)?;
                        if cell.is_empty() {
                            Vec::new()
                        } else {
                            let parts = split(cell, sep);
                            if parts.len() % item.span.max(1) != 0 {
                                return Err(self.structure(
                                    Some(cell),
                                    format!(
                                        "{} part(s) do not fill whole items of {} cell(s)",
                                        parts.len(),
                                        item.span
                                    ),
                                ));
                            }
                            self.decode_strides(&parts, item)?
                        }
                    }
                    _ => {
                        self.expect_span(cells, ty.span)?;
                        self.decode_strides(cells, item)?
                    }
                };
                Ok(Value::new(ValueKind::List(items), cells.first().cloned()))
            }
        }
    }

    /// Compile every field of a struct bean from exactly its span of cells
    pub fn compile_fields(&self, cells: &[Cell], bean: &TBean) -> Result<Vec<(String, Value)>> {
        let mut offset = 0;
        let mut fields = Vec::with_capacity(bean.fields.len());
        for (name, ty) in &bean.fields {
            let slot = &cells[offset..offset + ty.span];
            fields.push((name.clone(), self.compile(slot, ty, false)?));
            offset += ty.span;
        }
        Ok(fields)
    }

    fn compile_bean(&self, cells: &[Cell], bean: &TBean) -> Result<Value> {
        let origin = cells.first().cloned();
        if !bean.is_polymorphic() {
            if cells.len() != bean.span {
                return Err(self.structure(
                    cells.first(),
                    format!("{} expects {} cell(s), got {}", bean.name, bean.span, cells.len()),
                ));
            }
            let fields = self.compile_fields(cells, bean)?;
            return Ok(Value::new(
                ValueKind::Bean {
                    name: bean.name.clone(),
                    variant: None,
                    fields,
                },
                origin,
            ));
        }

        let Some((tag_cell, rest)) = cells.split_first() else {
            return Err(self.structure(None, format!("missing variant of {}", bean.name)));
        };
        let (tag, child) = self.variant(bean, tag_cell, tag_cell.data.trim())?;
        if rest.len() < child.span {
            return Err(self.structure(
                Some(tag_cell),
                format!("variant {} needs {} cell(s), got {}", tag, child.span, rest.len()),
            ));
        }
        let (used, padding) = rest.split_at(child.span);
        if let Some(extra) = padding.iter().find(|c| !c.is_empty()) {
            return Err(self.structure(Some(extra), format!("cell past the end of variant {}", tag)));
        }

        let fields = self.compile_fields(used, child)?;
        Ok(Value::new(
            ValueKind::Bean {
                name: bean.name.clone(),
                variant: Some(tag),
                fields,
            },
            origin,
        ))
    }

    fn variant<'b>(&self, bean: &'b TBean, cell: &Cell, tag: &str) -> Result<(String, &'b TBean)> {
        if tag.is_empty() {
            return Err(self.structure(Some(cell), format!("missing variant of {}", bean.name)));
        }
        match bean.variants.get(tag) {
            Some(child) => Ok((tag.to_string(), child)),
            None => {
                let known: Vec<&str> = bean.variants.keys().map(String::as_str).collect();
                Err(self.structure(
                    Some(cell),
                    format!("unknown variant '{}' of {}, expected one of {}", tag, bean.name, known.join(", ")),
                ))
            }
        }
    }

    /// Stride decoding with sentinel termination
    fn decode_strides(&self, cells: &[Cell], item: &ResolvedType) -> Result<Vec<Value>> {
        let stride = item.span.max(1);
        let mut state = ListState::ExpectItemOrEnd;
        let mut items = Vec::new();

        for group in cells.chunks(stride) {
            match state {
                ListState::ExpectItemOrEnd if group[0].is_empty() => {
                    state = ListState::Terminated;
                    self.expect_empty(group)?;
                }
                ListState::ExpectItemOrEnd => items.push(self.compile(group, item, false)?),
                ListState::Terminated => self.expect_empty(group)?,
            }
        }
        Ok(items)
    }

    fn expect_empty(&self, group: &[Cell]) -> Result<()> {
        match group.iter().find(|c| !c.is_empty()) {
            Some(cell) => Err(self.structure(Some(cell), "value after the end of the list")),
            None => Ok(()),
        }
    }

    /// Compile a parsed nested-grammar node; everything beneath is AsOne
    fn compile_node(&self, node: Node, ty: &ResolvedType, origin: &Cell) -> Result<Value> {
        match &ty.kind {
            TypeKind::Scalar(scalar) => match node {
                Node::Leaf(text) => self.scalar(&origin.with_data(text), *scalar),
                Node::Group(_) => Err(self.structure(
                    Some(origin),
                    format!("expected a single {} value, found a nested list", scalar),
                )),
            },
            TypeKind::List { item, .. } => {
                let items = node
                    .into_items()
                    .into_iter()
                    .map(|n| self.compile_node(n, item, origin))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::new(ValueKind::List(items), Some(origin.clone())))
            }
            TypeKind::Bean(name) => {
                let bean = self.bean(name)?;
                let mut items = node.into_items();
                let (variant, layout) = if bean.is_polymorphic() {
                    if items.is_empty() {
                        return Err(self.structure(Some(origin), format!("missing variant of {}", bean.name)));
                    }
                    let tag = match items.remove(0) {
                        Node::Leaf(tag) => tag,
                        Node::Group(_) => {
                            return Err(self.structure(
                                Some(origin),
                                format!("variant of {} must be a plain value", bean.name),
                            ))
                        }
                    };
                    let (tag, child) = self.variant(bean, origin, tag.trim())?;
                    (Some(tag), child)
                } else {
                    (None, bean)
                };

                if items.len() != layout.fields.len() {
                    return Err(self.structure(
                        Some(origin),
                        format!(
                            "{} expects {} value(s), got {}",
                            layout.name,
                            layout.fields.len(),
                            items.len()
                        ),
                    ));
                }
                let fields = layout
                    .fields
                    .iter()
                    .zip(items)
                    .map(|((name, fty), n)| -> Result<(String, Value)> {
                        Ok((name.clone(), self.compile_node(n, fty, origin)?))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(Value::new(
                    ValueKind::Bean {
                        name: bean.name.clone(),
                        variant,
                        fields,
                    },
                    Some(origin.clone()),
                ))
            }
        }
    }

    fn scalar(&self, cell: &Cell, scalar: Scalar) -> Result<Value> {
        let text = cell.data.trim();
        let kind = match scalar {
            Scalar::Bool => match text.to_ascii_lowercase().as_str() {
                "" | "false" | "0" => Some(ValueKind::Bool(false)),
                "true" | "1" => Some(ValueKind::Bool(true)),
                _ => None,
            },
            Scalar::Int if text.is_empty() => Some(ValueKind::Int(0)),
            Scalar::Int => text.parse().ok().map(ValueKind::Int),
            Scalar::Long if text.is_empty() => Some(ValueKind::Long(0)),
            Scalar::Long => text.parse().ok().map(ValueKind::Long),
            Scalar::Float if text.is_empty() => Some(ValueKind::Float(0.0)),
            Scalar::Float => text.parse().ok().map(ValueKind::Float),
            Scalar::Str => Some(ValueKind::Str(cell.data.clone())),
            Scalar::Text => Some(ValueKind::Text(cell.data.clone())),
        };

        match kind {
            Some(kind) => Ok(Value::new(kind, Some(cell.clone()))),
            None => {
                let message = format!("'{}' is not a valid {}", text, scalar);
                Err(match self.phase {
                    Phase::Inference => Error::type_inference(&self.scope, Some(cell), message),
                    Phase::Compile => Error::data_structure(&self.scope, Some(cell), message),
                })
            }
        }
    }

    fn bean(&self, name: &str) -> Result<&'a TBean> {
        self.beans
            .get(name)
            .ok_or_else(|| Error::definition(&self.scope, format!("unknown bean '{}'", name)))
    }

    fn single<'c>(&self, cells: &'c [Cell]) -> Result<&'c Cell> {
        match cells {
            [cell] => Ok(cell),
            _ => Err(self.structure(
                cells.first(),
                format!("expected exactly one cell, got {}", cells.len()),
            )),
        }
    }

    fn expect_span(&self, cells: &[Cell], span: usize) -> Result<()> {
        if cells.len() == span {
            Ok(())
        } else {
            Err(self.structure(
                cells.first(),
                format!("expected {} cell(s), got {}", span, cells.len()),
            ))
        }
    }

    fn structure(&self, cell: Option<&Cell>, message: impl Into<String>) -> Error {
        Error::data_structure(&self.scope, cell, message)
    }
}

/// Split one cell into logical cells at the same position
fn split(cell: &Cell, sep: char) -> Vec<Cell> {
    cell.data.split(sep).map(|part| cell.with_data(part.trim())).collect()
}

/// Rows of one table with a primary-key index
#[derive(Debug, Clone)]
pub struct CompiledTable {
    pub name: String,

    /// One bean value per data row, in file order
    pub rows: Vec<Value>,

    pub primary_key: Vec<String>,

    /// Primary key to the first row holding it
    index: HashMap<Vec<Value>, usize>,
}

impl CompiledTable {
    fn new(name: String, rows: Vec<Value>, primary_key: Vec<String>) -> Self {
        let mut index = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(key) = key_of(row, &primary_key) {
                index.entry(lookup_key(&key)).or_insert(i);
            }
        }
        Self {
            name,
            rows,
            primary_key,
            index,
        }
    }

    /// Row whose primary key equals `key`
    ///
    /// Integer keys match across `int` and `long`.
    pub fn find(&self, key: &[Value]) -> Option<&Value> {
        self.index.get(&lookup_key(key)).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Values of `columns` in a row, or `None` if a column is missing
pub fn key_of(row: &Value, columns: &[String]) -> Option<Vec<Value>> {
    columns.iter().map(|c| row.field(c).cloned()).collect()
}

/// `key` with every value in its lookup form
pub fn lookup_key(key: &[Value]) -> Vec<Value> {
    key.iter().map(Value::to_key).collect()
}

/// Every compiled table of a run
#[derive(Debug, Clone, Default)]
pub struct CompiledDb {
    pub tables: IndexMap<String, CompiledTable>,

    /// Tables left out because of table-local errors or missing data
    pub excluded: Vec<String>,
}

impl CompiledDb {
    pub fn table(&self, name: &str) -> Option<&CompiledTable> {
        self.tables.get(name)
    }
}

/// Compile one table's data rows
///
/// The header must lay out the table's columns in order with matching
/// spans. Blank rows are skipped; a non-empty cell outside every column is
/// an error.
pub fn compile_table(
    beans: &IndexMap<String, TBean>,
    table: &TTable,
    raw: &RawTable,
    header_rows: usize,
    phase: Phase,
) -> Result<CompiledTable> {
    let compiler = Compiler::new(beans, phase, table.name());
    let fields = raw
        .header_fields(header_rows)
        .map_err(|cell| compiler.structure(Some(&cell), "data under a column with no name"))?;
    check_header(&compiler, table, raw, header_rows, &fields)?;

    let offset = fields.first().map(|f| f.start).unwrap_or(0);
    let width = table.root.span;
    let mut rows = Vec::new();
    for row in raw.data_rows(header_rows, offset + width) {
        if let Some(extra) = row[offset + width..].iter().find(|c| !c.is_empty()) {
            return Err(compiler.structure(Some(extra), "cell outside every column"));
        }
        let cells = &row[offset..offset + width];
        let fields = compiler.compile_fields(cells, &table.root)?;
        rows.push(Value::new(
            ValueKind::Bean {
                name: table.name().to_string(),
                variant: None,
                fields,
            },
            cells.first().cloned(),
        ));
    }

    Ok(CompiledTable::new(
        table.name().to_string(),
        rows,
        table.primary_key.clone(),
    ))
}

fn check_header(
    compiler: &Compiler<'_>,
    table: &TTable,
    raw: &RawTable,
    header_rows: usize,
    fields: &[HeaderField],
) -> Result<()> {
    let header_cell = |field: &HeaderField| Cell::new(header_rows.saturating_sub(1), field.start, field.name.clone());

    if fields.len() != table.root.fields.len() {
        return Err(compiler.structure(
            None,
            format!(
                "header of {} has {} column(s), definition has {}",
                raw.name,
                fields.len(),
                table.root.fields.len()
            ),
        ));
    }
    let last = fields.len().saturating_sub(1);
    for (i, (field, (name, ty))) in fields.iter().zip(&table.root.fields).enumerate() {
        if &field.name != name {
            return Err(compiler.structure(
                Some(&header_cell(field)),
                format!("header names column '{}', definition expects '{}'", field.name, name),
            ));
        }
        // Trailing unnamed header cells past the last column are outside
        // every column, so they only have to stay empty
        if field.span != ty.span && !(i == last && field.span > ty.span) {
            return Err(compiler.structure(
                Some(&header_cell(field)),
                format!(
                    "column '{}' of type {} spans {} cell(s), header spans {}",
                    name, ty, ty.span, field.span
                ),
            ));
        }
    }
    Ok(())
}

/// Compile every table of the catalog
///
/// Table-local failures exclude the table and are reported to `sink`;
/// anything else aborts.
pub fn compile_all(
    catalog: &TypeCatalog,
    data: &DataDb,
    header_rows: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<CompiledDb> {
    let mut compiled = CompiledDb::default();
    for table in catalog.tables.values() {
        let name = table.name();
        let Some(raw) = data.get(name) else {
            tracing::warn!(table = %name, "no data for table");
            sink.push(
                Diagnostic::new(DiagnosticCode::Warning, Severity::Warn, "no data for table")
                    .with_location(Location::new(name)),
            );
            compiled.excluded.push(name.to_string());
            continue;
        };

        match compile_table(&catalog.beans, table, raw, header_rows, Phase::Compile) {
            Ok(t) => {
                tracing::debug!(table = %name, rows = t.len(), "table compiled");
                compiled.tables.insert(name.to_string(), t);
            }
            Err(e) if e.is_table_local() => {
                tracing::warn!(table = %name, error = %e, "table excluded");
                sink.push(Diagnostic::from_error(name, &e));
                compiled.excluded.push(name.to_string());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use configforge_define::Db;
    use pretty_assertions::assert_eq;

    fn catalog(json: &str) -> TypeCatalog {
        TypeCatalog::resolve(&Db::from_json(json).unwrap()).unwrap()
    }

    fn cells(texts: &[&str]) -> Vec<Cell> {
        texts.iter().enumerate().map(|(c, t)| Cell::new(5, c, *t)).collect()
    }

    const BEANS: &str = r#"{ "beans": [
        { "name": "Reward", "columns": [
          { "name": "item", "type": "int" },
          { "name": "name", "type": "string" } ] },
        { "name": "Pos", "compress": ":", "columns": [
          { "name": "x", "type": "int" },
          { "name": "y", "type": "int" } ] },
        { "name": "Action", "enum_ref": "ActionType", "children": [
          { "name": "Idle" },
          { "name": "Attack", "columns": [ { "name": "damage", "type": "int" } ] },
          { "name": "Move", "columns": [ { "name": "to", "type": "Pos" }, { "name": "speed", "type": "float" } ] } ] }
    ] }"#;

    fn list_of(item: &str, count: usize, compress: Compress, catalog: &TypeCatalog) -> ResolvedType {
        let db = Db::from_json(BEANS).unwrap();
        let expr = configforge_define::TypeExpr::parse(&format!("list<{},{}>", item, count)).unwrap();
        crate::types::resolve_type(&catalog.beans, &db, "t", &expr, compress).unwrap()
    }

    fn ints(values: &Value) -> Vec<i32> {
        match &values.kind {
            ValueKind::List(items) => items
                .iter()
                .map(|v| match v.kind {
                    ValueKind::Int(i) => i,
                    _ => panic!("not an int: {:?}", v),
                })
                .collect(),
            other => panic!("not a list: {:?}", other),
        }
    }

    #[test]
    fn column_span_list_stops_at_sentinel() {
        let catalog = catalog(BEANS);
        let ty = list_of("Reward", 3, Compress::None, &catalog);
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");

        let value = compiler.compile(&cells(&["1", "A", "2", "B", "", ""]), &ty, false).unwrap();
        assert_eq!(value.to_string(), "[Reward(1,A),Reward(2,B)]");
    }

    #[test]
    fn value_after_sentinel_cites_cell() {
        let catalog = catalog(BEANS);
        let ty = list_of("Reward", 4, Compress::None, &catalog);
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");

        let err = compiler
            .compile(&cells(&["1", "A", "2", "B", "", "", "3", "C"]), &ty, false)
            .unwrap_err();
        assert!(matches!(err, Error::DataStructure { .. }));
        let cell = err.cell().unwrap();
        assert_eq!((cell.row, cell.col, cell.data.as_str()), (5, 6, "3"));
    }

    #[test]
    fn separator_list() {
        let catalog = catalog(BEANS);
        let ty = list_of("int", 1, Compress::Separator(';'), &catalog);
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");

        assert_eq!(ints(&compiler.compile(&cells(&["1;2; 3"]), &ty, false).unwrap()), vec![1, 2, 3]);
        assert_eq!(ints(&compiler.compile(&cells(&[""]), &ty, false).unwrap()), Vec::<i32>::new());
        assert!(compiler.compile(&cells(&["1;;3"]), &ty, false).is_err());
        assert!(compiler.compile(&cells(&["1", "2"]), &ty, false).is_err());
    }

    #[test]
    fn as_one_nested_lists() {
        let catalog = catalog(BEANS);
        let ty = list_of("list<int>", 1, Compress::AsOne, &catalog);
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");

        let value = compiler.compile(&cells(&["(1,2),(),(3)"]), &ty, false).unwrap();
        assert_eq!(value.to_string(), "[[1,2],[],[3]]");
        // no sentinel rule inside the grammar
        let value = compiler.compile(&cells(&["(1,,2)"]), &ty, false).unwrap();
        assert_eq!(value.to_string(), "[[1,0,2]]");
    }

    #[test]
    fn as_one_hint_overrides_column_span() {
        let catalog = catalog(BEANS);
        let ty = list_of("Reward", 2, Compress::None, &catalog);
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");

        let value = compiler.compile(&cells(&["(1,sword),(2,\"a,b\")"]), &ty, true).unwrap();
        assert_eq!(value.to_string(), "[Reward(1,sword),Reward(2,a,b)]");
    }

    #[test]
    fn packed_bean_uses_its_separator() {
        let catalog = catalog(BEANS);
        let ty = ResolvedType {
            kind: TypeKind::Bean("Pos".into()),
            compress: Compress::None,
            span: 1,
        };
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");
        assert_eq!(compiler.compile(&cells(&["3:4"]), &ty, false).unwrap().to_string(), "Pos(3,4)");
        assert!(compiler.compile(&cells(&["3"]), &ty, false).is_err());
    }

    #[test]
    fn polymorphic_padding_must_be_empty() {
        let catalog = catalog(BEANS);
        let action = catalog.bean("Action").unwrap();
        assert_eq!(action.span, 3);
        let ty = ResolvedType {
            kind: TypeKind::Bean("Action".into()),
            compress: Compress::None,
            span: action.span,
        };
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");

        let v = compiler.compile(&cells(&["Attack", "7", ""]), &ty, false).unwrap();
        assert_eq!(v.to_string(), "Action.Attack(7)");
        let v = compiler.compile(&cells(&["Idle", "", ""]), &ty, false).unwrap();
        assert_eq!(v.to_string(), "Action.Idle()");

        let err = compiler.compile(&cells(&["Attack", "7", "x"]), &ty, false).unwrap_err();
        assert_eq!(err.cell().unwrap().col, 2);
        let err = compiler.compile(&cells(&["Fly", "", ""]), &ty, false).unwrap_err();
        assert!(err.to_string().contains("unknown variant 'Fly'"));
    }

    #[test]
    fn scalar_errors_depend_on_phase() {
        let catalog = catalog(BEANS);
        let ty = ResolvedType::scalar(Scalar::Int);
        let c = cells(&["abc"]);

        let err = Compiler::new(&catalog.beans, Phase::Inference, "items")
            .compile(&c, &ty, false)
            .unwrap_err();
        assert!(matches!(err, Error::TypeInference { .. }));

        let err = Compiler::new(&catalog.beans, Phase::Compile, "items")
            .compile(&c, &ty, false)
            .unwrap_err();
        assert!(matches!(err, Error::DataStructure { .. }));
    }

    #[test]
    fn empty_cells_are_zero() {
        let catalog = catalog(BEANS);
        let compiler = Compiler::new(&catalog.beans, Phase::Compile, "items");
        let c = cells(&[""]);
        assert!(compiler.compile(&c, &ResolvedType::scalar(Scalar::Bool), false).unwrap().is_zero());
        assert!(compiler.compile(&c, &ResolvedType::scalar(Scalar::Float), false).unwrap().is_zero());
        let t = compiler.compile(&cells(&["1"]), &ResolvedType::scalar(Scalar::Bool), false).unwrap();
        assert_eq!(t.to_string(), "true");
    }
}
