//! Foreign keys and key ranges declared on a bean

use configforge_core::{Error, Result};
use crate::persist::{ForeignKeyDef, KeyRangeDef};

/// Reference from local key columns to rows of another table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,

    /// Local key columns, in order
    pub keys: Vec<String>,

    /// Target table name
    pub target: String,

    /// Zero/empty key values are allowed to point nowhere
    pub nullable: bool,

    /// Target columns matched instead of the target's primary key
    pub key_ref: Option<Vec<String>>,
}

impl ForeignKey {
    pub(crate) fn from_def(scope: &str, def: &ForeignKeyDef) -> Result<Self> {
        crate::bean::check_ident(scope, "foreign key", &def.name)?;
        let fk_scope = format!("{}.{}", scope, def.name);
        if def.keys.is_empty() {
            return Err(Error::definition(fk_scope, "foreign key needs at least one key column"));
        }
        if def.target.trim().is_empty() {
            return Err(Error::definition(fk_scope, "foreign key needs a target table"));
        }
        if let Some(key_ref) = &def.key_ref {
            if key_ref.len() != def.keys.len() {
                return Err(Error::definition(
                    fk_scope,
                    format!(
                        "key_ref has {} column(s) but keys has {}",
                        key_ref.len(),
                        def.keys.len()
                    ),
                ));
            }
        }

        Ok(Self {
            name: def.name.clone(),
            keys: def.keys.clone(),
            target: def.target.to_lowercase(),
            nullable: def.nullable,
            key_ref: def.key_ref.clone(),
        })
    }

    pub(crate) fn to_def(&self) -> ForeignKeyDef {
        ForeignKeyDef {
            name: self.name.clone(),
            keys: self.keys.clone(),
            target: self.target.clone(),
            nullable: self.nullable,
            key_ref: self.key_ref.clone(),
        }
    }
}

/// Allowed values of a column
#[derive(Debug, Clone, PartialEq)]
pub enum RangeExpr {
    /// Inclusive numeric bounds (string length for text columns)
    Between(f64, f64),

    /// Explicit set of allowed texts
    OneOf(Vec<String>),
}

impl RangeExpr {
    /// Parse `"min,max"` or `"a|b|c"`
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let text = text.trim();
        if text.contains('|') {
            let values: Vec<String> = text.split('|').map(|v| v.trim().to_string()).collect();
            if values.iter().any(String::is_empty) {
                return Err(format!("empty enum member in '{}'", text));
            }
            return Ok(Self::OneOf(values));
        }

        let (min, max) = text
            .split_once(',')
            .ok_or_else(|| format!("range must be 'min,max' or 'a|b|c', got '{}'", text))?;
        let min: f64 = min.trim().parse().map_err(|_| format!("bad range minimum '{}'", min.trim()))?;
        let max: f64 = max.trim().parse().map_err(|_| format!("bad range maximum '{}'", max.trim()))?;
        if min > max {
            return Err(format!("range minimum {} exceeds maximum {}", min, max));
        }
        Ok(Self::Between(min, max))
    }

    pub fn contains_number(&self, v: f64) -> bool {
        match self {
            Self::Between(min, max) => *min <= v && v <= *max,
            Self::OneOf(values) => values.iter().any(|s| s.parse::<f64>().ok() == Some(v)),
        }
    }

    /// Text membership; `Between` bounds the character count
    pub fn contains_text(&self, v: &str) -> bool {
        match self {
            Self::Between(_, _) => self.contains_number(v.chars().count() as f64),
            Self::OneOf(values) => values.iter().any(|s| s == v),
        }
    }
}

impl std::fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Between(min, max) => write!(f, "{},{}", min, max),
            Self::OneOf(values) => write!(f, "{}", values.join("|")),
        }
    }
}

/// Range constraint on one column
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRange {
    /// Constrained column
    pub key: String,

    pub constraint: RangeExpr,
}

impl KeyRange {
    pub(crate) fn from_def(scope: &str, def: &KeyRangeDef) -> Result<Self> {
        let constraint = RangeExpr::parse(&def.range)
            .map_err(|e| Error::definition(format!("{}.{}", scope, def.key), e))?;
        Ok(Self {
            key: def.key.clone(),
            constraint,
        })
    }

    pub(crate) fn to_def(&self) -> KeyRangeDef {
        KeyRangeDef {
            key: self.key.clone(),
            range: self.constraint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parsing() {
        assert_eq!(RangeExpr::parse("1, 100").unwrap(), RangeExpr::Between(1.0, 100.0));
        assert_eq!(
            RangeExpr::parse("a|b").unwrap(),
            RangeExpr::OneOf(vec!["a".into(), "b".into()])
        );
        assert!(RangeExpr::parse("10,1").is_err());
        assert!(RangeExpr::parse("x").is_err());
        assert!(RangeExpr::parse("a||b").is_err());
    }

    #[test]
    fn range_membership() {
        let r = RangeExpr::Between(1.0, 3.0);
        assert!(r.contains_number(3.0));
        assert!(!r.contains_number(4.0));
        assert!(r.contains_text("abc"));
        assert!(!r.contains_text("abcd"));

        let e = RangeExpr::OneOf(vec!["fire".into(), "ice".into()]);
        assert!(e.contains_text("ice"));
        assert!(!e.contains_text("Ice"));
    }

    #[test]
    fn range_text_is_stable() {
        let r = RangeExpr::parse("1,100").unwrap();
        assert_eq!(r.to_string(), "1,100");
        assert_eq!(RangeExpr::parse(&r.to_string()).unwrap(), r);
    }

    #[test]
    fn key_ref_arity_checked() {
        let def = ForeignKeyDef {
            name: "owner".into(),
            keys: vec!["owner_id".into()],
            target: "npc".into(),
            nullable: false,
            key_ref: Some(vec!["a".into(), "b".into()]),
        };
        assert!(ForeignKey::from_def("items", &def).is_err());
    }
}
