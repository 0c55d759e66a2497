//! Own tags: which consumers a schema element belongs to

use std::collections::BTreeSet;

/// Set of own tags, persisted as a comma-separated attribute (`"client,server"`)
///
/// Matching is exact set membership: `"server_debug"` does not own `"server"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OwnTags(BTreeSet<String>);

impl OwnTags {
    /// Parse from the persisted attribute; blanks between commas are ignored
    pub fn parse(attr: &str) -> Self {
        Self(
            attr.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Whether `tag` is one of the tags
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Persisted attribute form, tags sorted
    pub fn to_attr(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for OwnTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_contains() {
        let tags = OwnTags::parse("client, server");
        assert!(tags.contains("client"));
        assert!(tags.contains("server"));
        assert!(!tags.contains("editor"));
    }

    #[test]
    fn no_substring_match() {
        let tags = OwnTags::parse("server_debug");
        assert!(!tags.contains("server"));
        assert!(!tags.contains("debug"));
    }

    #[test]
    fn attr_round_trip() {
        let tags = OwnTags::parse("server,client,");
        assert_eq!(tags.to_attr(), "client,server");
        assert_eq!(OwnTags::parse(&tags.to_attr()), tags);
        assert!(OwnTags::parse("").is_empty());
    }
}
