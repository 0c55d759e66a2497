//! Resolved types: the schema definition with every type expression bound
//! and every column span computed
//!
//! Spans drive the column-span layout. A scalar occupies one cell, a
//! struct bean the sum of its fields, a polymorphic bean one discriminant
//! cell plus its widest variant, and anything packed into a single cell
//! (AsOne, separator lists, compressed beans) exactly one cell.

use configforge_core::{Error, Result};
use configforge_define::{Bean, BeanKind, ColumnCompress, Db, ForeignKey, KeyRange, Table, TypeExpr};
use indexmap::IndexMap;

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    Int,
    Long,
    Float,
    Str,
    Text,
}

impl Scalar {
    /// Look up a type keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "string" => Some(Self::Str),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Str => "string",
            Self::Text => "text",
        }
    }

    /// Narrowest kind that accepts `text`
    ///
    /// Only `true`/`false` detect as bool; digits detect as numbers even
    /// though a bool column also accepts `1`/`0`.
    pub fn detect(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            Self::Bool
        } else if text.parse::<i32>().is_ok() {
            Self::Int
        } else if text.parse::<i64>().is_ok() {
            Self::Long
        } else if text.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
            Self::Float
        } else {
            Self::Str
        }
    }

    /// Smallest kind accepting values of both kinds
    pub fn widen(self, other: Self) -> Self {
        use Scalar::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int | Long | Float, Int | Long | Float) => {
                if self == Float || other == Float {
                    Float
                } else {
                    Long
                }
            }
            (Text, _) | (_, Text) => Text,
            _ => Str,
        }
    }

    /// Kind accepting every non-empty text; `None` if all are empty
    pub fn infer<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        texts
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .map(Self::detect)
            .reduce(Self::widen)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// How a value is laid out in the cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compress {
    /// Column-span layout
    #[default]
    None,

    /// One cell, nested-list grammar; inherited by everything beneath
    AsOne,

    /// One cell split by a separator
    Separator(char),
}

impl Compress {
    /// Whether the value sits in a single cell
    pub fn is_packed(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl From<ColumnCompress> for Compress {
    fn from(c: ColumnCompress) -> Self {
        match c {
            ColumnCompress::None => Self::None,
            ColumnCompress::AsOne => Self::AsOne,
            ColumnCompress::Separator(sep) => Self::Separator(sep),
        }
    }
}

/// Shape of a resolved type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Scalar(Scalar),

    /// Shared bean, by name
    Bean(String),

    /// `count` is the number of stride groups in column-span layout
    List { item: Box<ResolvedType>, count: usize },
}

/// A type bound against the catalog, with its cell span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub kind: TypeKind,

    pub compress: Compress,

    /// Number of raw cells one value occupies
    pub span: usize,
}

impl ResolvedType {
    pub fn scalar(scalar: Scalar) -> Self {
        Self {
            kind: TypeKind::Scalar(scalar),
            compress: Compress::None,
            span: 1,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, TypeKind::List { .. })
    }
}

impl std::fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeKind::Scalar(s) => write!(f, "{}", s),
            TypeKind::Bean(name) => write!(f, "{}", name),
            TypeKind::List { item, count: 0 } => write!(f, "list<{}>", item),
            TypeKind::List { item, count } => write!(f, "list<{},{}>", item, count),
        }
    }
}

/// A bean with resolved field types
#[derive(Debug, Clone, PartialEq)]
pub struct TBean {
    pub name: String,

    /// Fields in declared order
    pub fields: IndexMap<String, ResolvedType>,

    /// Discriminant enum and variants, for a polymorphic base
    pub enum_ref: Option<String>,

    pub variants: IndexMap<String, TBean>,

    /// Separator when the bean always sits in one cell
    pub packed: Option<char>,

    /// Cells of the unpacked layout
    pub span: usize,

    pub foreign_keys: Vec<ForeignKey>,

    pub ranges: Vec<KeyRange>,
}

impl TBean {
    pub fn is_polymorphic(&self) -> bool {
        self.enum_ref.is_some()
    }
}

/// A table with its resolved row layout
#[derive(Debug, Clone, PartialEq)]
pub struct TTable {
    /// Definition the table was resolved from
    pub define: Table,

    /// Row layout
    pub root: TBean,

    /// Effective primary key
    pub primary_key: Vec<String>,
}

impl TTable {
    pub fn name(&self) -> &str {
        &self.define.name
    }
}

/// Every resolved bean and table of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeCatalog {
    pub beans: IndexMap<String, TBean>,

    pub tables: IndexMap<String, TTable>,
}

impl TypeCatalog {
    /// Resolve a complete definition; every column must be typed
    pub fn resolve(db: &Db) -> Result<Self> {
        let beans = resolve_beans(db)?;
        let mut tables = IndexMap::new();
        for table in db.tables.values() {
            table.check_columns()?;
            let resolved = resolve_table(&beans, db, table)?;
            tables.insert(table.name.clone(), resolved);
        }
        Ok(Self { beans, tables })
    }

    pub fn bean(&self, name: &str) -> Option<&TBean> {
        self.beans.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&TTable> {
        self.tables.get(name)
    }
}

/// Resolve every shared bean of `db`
pub fn resolve_beans(db: &Db) -> Result<IndexMap<String, TBean>> {
    let mut resolver = BeanResolver {
        db,
        done: IndexMap::new(),
        stack: Vec::new(),
    };
    for name in db.beans.keys() {
        resolver.resolve_named(name, name)?;
    }
    // Keep definition order rather than completion order
    let mut done = resolver.done;
    Ok(db
        .beans
        .keys()
        .filter_map(|name| done.swap_remove(name).map(|b| (name.clone(), b)))
        .collect())
}

/// Resolve one table against already resolved beans
pub fn resolve_table(beans: &IndexMap<String, TBean>, db: &Db, table: &Table) -> Result<TTable> {
    let mut resolver = BeanResolver {
        db,
        done: beans.clone(),
        stack: Vec::new(),
    };
    let root = resolver.resolve_bean(&table.name, &table.bean)?;
    Ok(TTable {
        define: table.clone(),
        root,
        primary_key: table.primary_key_columns(),
    })
}

/// Resolve a single type expression (used when checking inferred or declared
/// column types against the header layout)
pub fn resolve_type(
    beans: &IndexMap<String, TBean>,
    db: &Db,
    scope: &str,
    expr: &TypeExpr,
    compress: Compress,
) -> Result<ResolvedType> {
    let mut resolver = BeanResolver {
        db,
        done: beans.clone(),
        stack: Vec::new(),
    };
    resolver.resolve_type(scope, expr, compress)
}

struct BeanResolver<'a> {
    db: &'a Db,
    done: IndexMap<String, TBean>,
    /// Beans currently being laid out, for cycle detection
    stack: Vec<String>,
}

impl BeanResolver<'_> {
    fn resolve_named(&mut self, scope: &str, name: &str) -> Result<usize> {
        if let Some(bean) = self.done.get(name) {
            return Ok(bean.span);
        }
        if self.stack.iter().any(|n| n == name) {
            let mut cycle = self.stack.clone();
            cycle.push(name.to_string());
            return Err(Error::definition(
                scope,
                format!("bean layout is recursive: {}", cycle.join(" -> ")),
            ));
        }
        let def = self
            .db
            .bean(name)
            .ok_or_else(|| Error::definition(scope, format!("unknown bean '{}'", name)))?;

        self.stack.push(name.to_string());
        let resolved = self.resolve_bean(name, def);
        self.stack.pop();

        let resolved = resolved?;
        let span = resolved.span;
        self.done.insert(name.to_string(), resolved);
        Ok(span)
    }

    fn resolve_bean(&mut self, scope: &str, bean: &Bean) -> Result<TBean> {
        let mut fields = IndexMap::new();
        for column in bean.columns.values() {
            let col_scope = format!("{}.{}", scope, column.name);
            if column.is_untyped() {
                return Err(Error::definition(col_scope, "column has no type"));
            }
            let expr = TypeExpr::parse(&column.ty).map_err(|e| Error::definition(&col_scope, e))?;
            let ty = self.resolve_type(&col_scope, &expr, column.compress.into())?;
            fields.insert(column.name.clone(), ty);
        }

        let mut variants = IndexMap::new();
        let enum_ref = match &bean.kind {
            BeanKind::PolymorphicBase { enum_ref, children } => {
                for child in children.values() {
                    let child_scope = format!("{}.{}", scope, child.name);
                    variants.insert(child.name.clone(), self.resolve_bean(&child_scope, child)?);
                }
                Some(enum_ref.clone())
            }
            _ => None,
        };

        let span = if enum_ref.is_some() {
            variants.values().map(|v: &TBean| v.span).max().unwrap_or(0).checked_add(1)
        } else {
            fields
                .values()
                .try_fold(0usize, |acc, f: &ResolvedType| acc.checked_add(f.span))
        }
        .ok_or_else(|| Error::definition(scope, "bean spans too many cells"))?;

        Ok(TBean {
            name: bean.name.clone(),
            fields,
            enum_ref,
            variants,
            packed: bean.compress,
            span,
            foreign_keys: bean.foreign_keys.values().cloned().collect(),
            ranges: bean.ranges.values().cloned().collect(),
        })
    }

    fn resolve_type(&mut self, scope: &str, expr: &TypeExpr, compress: Compress) -> Result<ResolvedType> {
        match expr {
            TypeExpr::Scalar(keyword) => {
                let scalar = Scalar::from_keyword(keyword)
                    .ok_or_else(|| Error::definition(scope, format!("unknown scalar '{}'", keyword)))?;
                Ok(ResolvedType {
                    kind: TypeKind::Scalar(scalar),
                    compress: if compress == Compress::AsOne { compress } else { Compress::None },
                    span: 1,
                })
            }
            TypeExpr::Bean(name) => {
                let def = self
                    .db
                    .bean(name)
                    .ok_or_else(|| Error::definition(scope, format!("unknown bean '{}'", name)))?;
                let span = if compress.is_packed() || def.compress.is_some() {
                    // Packed beans may refer to themselves; only the layout must be finite
                    1
                } else {
                    self.resolve_named(scope, name)?
                };
                Ok(ResolvedType {
                    kind: TypeKind::Bean(name.clone()),
                    compress,
                    span,
                })
            }
            TypeExpr::List { item, count } => {
                let item_compress = if compress == Compress::AsOne {
                    Compress::AsOne
                } else {
                    Compress::None
                };
                let item = self.resolve_type(scope, item, item_compress)?;
                let span = match compress {
                    Compress::None => {
                        if *count == 0 {
                            return Err(Error::definition(
                                scope,
                                format!("column-span list needs a count, e.g. list<{},3>", item),
                            ));
                        }
                        item.span.checked_mul(*count).ok_or_else(|| {
                            Error::definition(scope, format!("list<{},{}> spans too many cells", item, count))
                        })?
                    }
                    _ => 1,
                };
                Ok(ResolvedType {
                    kind: TypeKind::List {
                        item: Box::new(item),
                        count: *count,
                    },
                    compress,
                    span,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINE: &str = r#"{
  "beans": [
    { "name": "Reward", "columns": [
      { "name": "item", "type": "int" },
      { "name": "count", "type": "int" } ] },
    { "name": "Pos", "compress": ":", "columns": [
      { "name": "x", "type": "float" },
      { "name": "y", "type": "float" } ] },
    { "name": "Action", "enum_ref": "ActionType", "children": [
      { "name": "Idle" },
      { "name": "Attack", "columns": [
        { "name": "target", "type": "int" },
        { "name": "damage", "type": "list<int,2>" } ] } ] }
  ],
  "tables": [
    { "name": "items", "columns": [
      { "name": "id", "type": "int" },
      { "name": "rewards", "type": "list<Reward,3>" },
      { "name": "tags", "type": "list<string>", "compress": ";" },
      { "name": "grid", "type": "list<list<int>>", "compress": "asone" },
      { "name": "pos", "type": "Pos" },
      { "name": "action", "type": "Action" } ] }
  ]
}"#;

    #[test]
    fn scalar_detection_and_widening() {
        assert_eq!(Scalar::detect("TRUE"), Scalar::Bool);
        assert_eq!(Scalar::detect("42"), Scalar::Int);
        assert_eq!(Scalar::detect("9000000000"), Scalar::Long);
        assert_eq!(Scalar::detect("1.5"), Scalar::Float);
        assert_eq!(Scalar::detect("NaN"), Scalar::Str);
        assert_eq!(Scalar::Int.widen(Scalar::Long), Scalar::Long);
        assert_eq!(Scalar::Long.widen(Scalar::Float), Scalar::Float);
        assert_eq!(Scalar::Bool.widen(Scalar::Int), Scalar::Str);
        assert_eq!(Scalar::infer(["1", "", "2.5"]), Some(Scalar::Float));
        assert_eq!(Scalar::infer(["", " "]), None);
    }

    #[test]
    fn spans_are_computed_recursively() {
        let db = Db::from_json(DEFINE).unwrap();
        let catalog = TypeCatalog::resolve(&db).unwrap();
        let items = catalog.table("items").unwrap();
        let spans: Vec<(&str, usize)> = items
            .root
            .fields
            .iter()
            .map(|(n, t)| (n.as_str(), t.span))
            .collect();
        assert_eq!(
            spans,
            vec![("id", 1), ("rewards", 6), ("tags", 1), ("grid", 1), ("pos", 1), ("action", 4)]
        );
        assert_eq!(items.root.span, 14);
        assert_eq!(items.primary_key, vec!["id".to_string()]);
    }

    #[test]
    fn as_one_reaches_nested_lists() {
        let db = Db::from_json(DEFINE).unwrap();
        let catalog = TypeCatalog::resolve(&db).unwrap();
        let grid = &catalog.table("items").unwrap().root.fields["grid"];
        match &grid.kind {
            TypeKind::List { item, .. } => {
                assert_eq!(item.compress, Compress::AsOne);
                assert_eq!(item.span, 1);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn recursive_layout_is_rejected() {
        let json = r#"{ "beans": [
            { "name": "Node", "columns": [ { "name": "next", "type": "Node" } ] }
        ] }"#;
        let db = Db::from_json(json).unwrap();
        let err = TypeCatalog::resolve(&db).unwrap_err();
        assert!(err.to_string().contains("recursive"));
    }

    #[test]
    fn packed_recursion_is_allowed() {
        let json = r#"{ "beans": [
            { "name": "Tree", "columns": [
              { "name": "value", "type": "int" },
              { "name": "children", "type": "list<Tree>", "compress": "asone" } ] }
        ] }"#;
        let db = Db::from_json(json).unwrap();
        let catalog = TypeCatalog::resolve(&db).unwrap();
        assert_eq!(catalog.bean("Tree").unwrap().span, 2);
    }

    #[test]
    fn unbounded_column_span_list_is_rejected() {
        let json = r#"{ "tables": [ { "name": "t", "columns": [
            { "name": "id", "type": "int" },
            { "name": "xs", "type": "list<int>" } ] } ] }"#;
        let db = Db::from_json(json).unwrap();
        assert!(matches!(TypeCatalog::resolve(&db), Err(Error::Definition { .. })));
    }

    #[test]
    fn oversized_column_span_list_is_rejected() {
        let json = r#"{ "tables": [ { "name": "t", "columns": [
            { "name": "id", "type": "int" },
            { "name": "xs", "type": "list<list<int,4294967296>,4294967296>" } ] } ] }"#;
        let db = Db::from_json(json).unwrap();
        assert!(matches!(TypeCatalog::resolve(&db), Err(Error::Definition { .. })));
    }
}
