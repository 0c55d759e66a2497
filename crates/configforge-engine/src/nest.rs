//! Nested-list grammar for values packed into one cell
//!
//! ```text
//! seq  := item (',' item)*  |  <empty>
//! item := '(' seq ')'  |  '"' quoted '"'  |  bare
//! ```
//!
//! Bare items are trimmed and may not contain `,()`. Inside quotes a
//! doubled `""` stands for one `"`. `()` is an empty sub-list and an
//! empty cell is an empty top-level sequence.

/// One parsed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(String),
    Group(Vec<Node>),
}

impl Node {
    /// Items of a group; a non-empty leaf counts as a one-item group
    pub fn into_items(self) -> Vec<Node> {
        match self {
            Node::Group(items) => items,
            Node::Leaf(text) if text.trim().is_empty() => Vec::new(),
            leaf => vec![leaf],
        }
    }
}

/// Parse the text of one cell into its top-level items
pub fn decode(text: &str) -> Result<Vec<Node>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parser = Parser { chars: &chars, pos: 0 };
    parser.skip_ws();
    if parser.at_end() {
        return Ok(Vec::new());
    }
    let items = parser.seq(false)?;
    if !parser.at_end() {
        return Err(format!("unexpected '{}' at offset {}", chars[parser.pos], parser.pos));
    }
    Ok(items)
}

/// Render items so that `decode(&encode(items)) == items`
pub fn encode(items: &[Node]) -> String {
    items.iter().map(encode_node).collect::<Vec<_>>().join(",")
}

fn encode_node(node: &Node) -> String {
    match node {
        Node::Group(items) => format!("({})", encode(items)),
        Node::Leaf(text) => {
            let needs_quotes = text.is_empty()
                || text.contains([',', '(', ')', '"'])
                || text.starts_with(char::is_whitespace)
                || text.ends_with(char::is_whitespace);
            if needs_quotes {
                format!("\"{}\"", text.replace('"', "\"\""))
            } else {
                text.clone()
            }
        }
    }
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn seq(&mut self, nested: bool) -> Result<Vec<Node>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            items.push(self.item()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') if nested => return Ok(items),
                None if !nested => return Ok(items),
                None => return Err("unclosed '('".to_string()),
                Some(c) => return Err(format!("unexpected '{}' at offset {}", c, self.pos)),
            }
        }
    }

    fn item(&mut self) -> Result<Node, String> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                self.skip_ws();
                let items = if self.peek() == Some(')') {
                    Vec::new()
                } else {
                    self.seq(true)?
                };
                if self.peek() != Some(')') {
                    return Err("unclosed '('".to_string());
                }
                self.pos += 1;
                Ok(Node::Group(items))
            }
            Some('"') => {
                self.pos += 1;
                let mut text = String::new();
                loop {
                    match self.peek() {
                        None => return Err("unterminated quote".to_string()),
                        Some('"') if self.chars.get(self.pos + 1) == Some(&'"') => {
                            text.push('"');
                            self.pos += 2;
                        }
                        Some('"') => {
                            self.pos += 1;
                            return Ok(Node::Leaf(text));
                        }
                        Some(c) => {
                            text.push(c);
                            self.pos += 1;
                        }
                    }
                }
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    match c {
                        ',' | ')' => break,
                        '(' => return Err(format!("unexpected '(' at offset {}", self.pos)),
                        _ => self.pos += 1,
                    }
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                Ok(Node::Leaf(text.trim().to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(s: &str) -> Node {
        Node::Leaf(s.to_string())
    }

    #[test]
    fn flat_and_nested() {
        assert_eq!(decode("1, 2,3").unwrap(), vec![leaf("1"), leaf("2"), leaf("3")]);
        assert_eq!(
            decode("(1,2),(3),()").unwrap(),
            vec![
                Node::Group(vec![leaf("1"), leaf("2")]),
                Node::Group(vec![leaf("3")]),
                Node::Group(vec![]),
            ]
        );
        assert_eq!(decode("").unwrap(), Vec::<Node>::new());
        assert_eq!(decode("a,,b").unwrap(), vec![leaf("a"), leaf(""), leaf("b")]);
    }

    #[test]
    fn quoted_items() {
        assert_eq!(
            decode(r#""a,b","say ""hi""""#).unwrap(),
            vec![leaf("a,b"), leaf(r#"say "hi""#)]
        );
    }

    #[test]
    fn malformed() {
        assert!(decode("(1,2").is_err());
        assert!(decode("1)").is_err());
        assert!(decode("\"open").is_err());
        assert!(decode("a(b)").is_err());
        assert!(decode("\"a\"b").is_err());
    }

    fn tree() -> impl Strategy<Value = Node> {
        let leaf = any::<String>().prop_map(Node::Leaf);
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(Node::Group)
        })
    }

    proptest! {
        #[test]
        fn encode_then_decode_is_identity(items in prop::collection::vec(tree(), 0..4)) {
            prop_assert_eq!(decode(&encode(&items)).unwrap(), items);
        }
    }
}
