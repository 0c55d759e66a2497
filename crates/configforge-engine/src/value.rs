//! Compiled values
//!
//! Equality and hashing are structural and order-sensitive, and ignore
//! where a value came from: two rows with the same cell texts compare equal
//! even though their cells sit at different positions.

use configforge_core::Cell;
use std::hash::{Hash, Hasher};

/// A compiled value tree
#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,

    /// Cell the value was read from, for diagnostics
    pub origin: Option<Cell>,
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f64),
    Str(String),
    Text(String),
    Bean {
        name: String,
        /// Chosen child of a polymorphic bean
        variant: Option<String>,
        fields: Vec<(String, Value)>,
    },
    List(Vec<Value>),
}

impl Value {
    pub fn new(kind: ValueKind, origin: Option<Cell>) -> Self {
        Self { kind, origin }
    }

    /// Field of a bean value by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.kind {
            ValueKind::Bean { fields, .. } => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Numeric view used by range checks
    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Int(v) => Some(v as f64),
            ValueKind::Long(v) => Some(v as f64),
            ValueKind::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Zero value of its scalar kind (what an empty cell compiles to)
    pub fn is_zero(&self) -> bool {
        match &self.kind {
            ValueKind::Bool(v) => !v,
            ValueKind::Int(v) => *v == 0,
            ValueKind::Long(v) => *v == 0,
            ValueKind::Float(v) => *v == 0.0,
            ValueKind::Str(v) | ValueKind::Text(v) => v.is_empty(),
            ValueKind::Bean { .. } => false,
            ValueKind::List(items) => items.is_empty(),
        }
    }

    /// Form used for key lookups
    ///
    /// Each table's columns are typed on their own, so an `int` column may
    /// reference a `long` key. Integers widen to `long` here.
    pub fn to_key(&self) -> Value {
        match self.kind {
            ValueKind::Int(v) => Value::new(ValueKind::Long(v.into()), self.origin.clone()),
            _ => self.clone(),
        }
    }

    /// Position of the first cell this value was read from
    pub fn first_origin(&self) -> Option<&Cell> {
        if let Some(cell) = &self.origin {
            return Some(cell);
        }
        match &self.kind {
            ValueKind::Bean { fields, .. } => fields.iter().find_map(|(_, v)| v.first_origin()),
            ValueKind::List(items) => items.iter().find_map(Value::first_origin),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        use ValueKind::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Str(a), Str(b)) | (Text(a), Text(b)) => a == b,
            (
                Bean { name: n1, variant: v1, fields: f1 },
                Bean { name: n2, variant: v2, fields: f2 },
            ) => n1 == n2 && v1 == v2 && f1 == f2,
            (List(a), List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ValueKind {}

impl Hash for ValueKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ValueKind::Bool(v) => v.hash(state),
            ValueKind::Int(v) => v.hash(state),
            ValueKind::Long(v) => v.hash(state),
            ValueKind::Float(v) => v.to_bits().hash(state),
            ValueKind::Str(v) | ValueKind::Text(v) => v.hash(state),
            ValueKind::Bean { name, variant, fields } => {
                name.hash(state);
                variant.hash(state);
                fields.hash(state);
            }
            ValueKind::List(items) => items.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValueKind::Bool(v) => write!(f, "{}", v),
            ValueKind::Int(v) => write!(f, "{}", v),
            ValueKind::Long(v) => write!(f, "{}", v),
            ValueKind::Float(v) => write!(f, "{}", v),
            ValueKind::Str(v) | ValueKind::Text(v) => write!(f, "{}", v),
            ValueKind::Bean { name, variant, fields } => {
                write!(f, "{}", name)?;
                if let Some(variant) = variant {
                    write!(f, ".{}", variant)?;
                }
                write!(f, "(")?;
                for (i, (_, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            ValueKind::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn int_at(v: i32, row: usize) -> Value {
        Value::new(ValueKind::Int(v), Some(Cell::new(row, 0, v.to_string())))
    }

    #[test]
    fn origin_is_ignored() {
        assert_eq!(int_at(1, 2), int_at(1, 9));

        let mut set = HashSet::new();
        set.insert(int_at(1, 2));
        assert!(set.contains(&int_at(1, 9)));
        assert!(!set.contains(&int_at(2, 2)));
    }

    #[test]
    fn floats_compare_bitwise() {
        let nan = Value::new(ValueKind::Float(f64::NAN), None);
        assert_eq!(nan, nan.clone());
        assert_ne!(
            Value::new(ValueKind::Float(0.0), None),
            Value::new(ValueKind::Float(-0.0), None)
        );
    }

    #[test]
    fn lists_are_order_sensitive() {
        let a = Value::new(ValueKind::List(vec![int_at(1, 0), int_at(2, 0)]), None);
        let b = Value::new(ValueKind::List(vec![int_at(2, 0), int_at(1, 0)]), None);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "[1,2]");
    }

    #[test]
    fn str_and_text_differ() {
        let s = Value::new(ValueKind::Str("a".into()), None);
        let t = Value::new(ValueKind::Text("a".into()), None);
        assert_ne!(s, t);
    }

    #[test]
    fn key_form_widens_integers() {
        let long = Value::new(ValueKind::Long(1), None);
        assert_eq!(int_at(1, 0).to_key(), long);
        assert_eq!(long.to_key(), long);
        assert_ne!(int_at(1, 0), long);
    }
}
