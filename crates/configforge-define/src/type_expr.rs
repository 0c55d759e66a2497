//! Column type expressions
//!
//! Grammar:
//!
//! ```text
//! ty     := scalar | BeanName | 'list<' ty [',' count] '>'
//! scalar := 'bool' | 'int' | 'long' | 'float' | 'string' | 'text'
//! ```

/// Parsed column type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Built-in scalar, by keyword
    Scalar(String),

    /// Reference to a named bean
    Bean(String),

    /// List of items; `count` is the number of column-span slots (0 = unbounded)
    List { item: Box<TypeExpr>, count: usize },
}

/// Scalar keywords accepted in type expressions
pub const SCALAR_KEYWORDS: &[&str] = &["bool", "int", "long", "float", "string", "text"];

impl TypeExpr {
    /// Parse a type expression
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty type".to_string());
        }

        if let Some(rest) = text.strip_prefix("list<") {
            let inner = rest
                .strip_suffix('>')
                .ok_or_else(|| format!("unterminated list type '{}'", text))?;

            // The count, if any, follows the last top-level comma
            let (item_text, count) = match split_top_level_comma(inner) {
                Some((item, count)) => {
                    let count: usize = count
                        .trim()
                        .parse()
                        .map_err(|_| format!("bad list count '{}' in '{}'", count.trim(), text))?;
                    if count == 0 {
                        return Err(format!("list count must be positive in '{}'", text));
                    }
                    (item, count)
                }
                None => (inner, 0),
            };

            let item = Self::parse(item_text)?;
            return Ok(Self::List {
                item: Box::new(item),
                count,
            });
        }

        if SCALAR_KEYWORDS.contains(&text) {
            return Ok(Self::Scalar(text.to_string()));
        }

        if text.contains(['<', '>', ',']) || text.contains(char::is_whitespace) {
            return Err(format!("malformed type '{}'", text));
        }

        Ok(Self::Bean(text.to_string()))
    }

    /// Names of every bean referenced, outermost first
    pub fn bean_refs(&self) -> Vec<&str> {
        match self {
            Self::Scalar(_) => vec![],
            Self::Bean(name) => vec![name.as_str()],
            Self::List { item, .. } => item.bean_refs(),
        }
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(name) | Self::Bean(name) => write!(f, "{}", name),
            Self::List { item, count: 0 } => write!(f, "list<{}>", item),
            Self::List { item, count } => write!(f, "list<{},{}>", item, count),
        }
    }
}

/// Split `item,count` at the last comma that is not nested in angle brackets
fn split_top_level_comma(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let mut split = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => split = Some(i),
            _ => {}
        }
    }
    split.map(|i| (&text[..i], &text[i + 1..]))
}
