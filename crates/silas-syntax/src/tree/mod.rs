//! # Document Tree
//!
//! The parser produces a plain owned tree:
//!
//! ```text
//! ParsedFile
//! ├── Preamble            (#+KEY: value lines)
//! └── Vec<Node>
//!     ├── Section         (heading, properties, nested nodes)
//!     ├── Paragraph       (inline runs)
//!     ├── Block           (comment, quote, source code)
//!     └── List            (entries of inline runs and nested lists)
//! ```
//!
//! Every node renders to HTML through [`render`] and can be walked with a
//! [`visit::Visitor`]. Links are the only nodes that change after parsing:
//! each one caches its resolution the first time it is rendered or
//! checked.

pub mod inline;
pub mod preamble;
pub mod render;
pub mod visit;

pub use inline::{Inline, Link, LinkResolution, ResolvedLink, StyleAttribute};
pub use preamble::Preamble;

/// Ordered key/value pairs from a properties drawer or the preamble.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace a value. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Section(Section),
    Paragraph(Paragraph),
    Block(Block),
    List(List),
}

/// A heading and everything up to the next heading of the same or a
/// shallower level.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Zero for `*`, one for `**`, and so on.
    pub level: usize,
    pub title: String,
    /// `CUSTOM_ID` property if present, the slugified title otherwise.
    pub id: String,
    pub properties: Properties,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Comment {
        content: Vec<Inline>,
    },
    Quote {
        content: Vec<Inline>,
        quotee: Option<Vec<Inline>>,
    },
    Code {
        language: Option<String>,
        lines: Vec<String>,
    },
}

impl Block {
    /// Block name as written after `#+BEGIN_`.
    pub fn name(&self) -> &'static str {
        match self {
            Block::Comment { .. } => "COMMENT",
            Block::Quote { .. } => "QUOTE",
            Block::Code { .. } => "SRC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `1.`, `2.`, ... numbered consecutively from one.
    Ordered,
    /// `-` or `+`; every entry of one list uses the same marker.
    Unordered(char),
}

impl ListStyle {
    /// Columns a continuation line of an entry is indented by.
    pub fn indentation(self) -> usize {
        match self {
            ListStyle::Ordered => 3,
            ListStyle::Unordered(_) => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub style: ListStyle,
    pub entries: Vec<ListEntry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListEntry {
    pub content: Vec<EntryContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryContent {
    Text(Vec<Inline>),
    List(List),
}

/// Lowercase, spaces to hyphens, then drop everything but `[a-z0-9-]`.
///
/// ```
/// assert_eq!(silas_syntax::tree::slugify("Hello World!"), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Uppercase the first character and lowercase the rest.
///
/// ```
/// assert_eq!(silas_syntax::tree::titlecase("bLOG"), "Blog");
/// ```
pub fn titlecase(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Hello World", "hello-world")]
    #[case("What's new?", "whats-new")]
    #[case("Über 9000", "ber-9000")]
    #[case("already-slugged", "already-slugged")]
    fn slugify_titles(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[test]
    fn titlecase_identifiers() {
        assert_eq!(titlecase("projects"), "Projects");
        assert_eq!(titlecase(""), "");
    }

    #[test]
    fn properties_keep_insertion_order() {
        let mut properties = Properties::default();
        properties.insert("B", "1");
        properties.insert("A", "2");
        assert_eq!(properties.insert("B", "3"), Some("1".to_string()));

        let pairs: Vec<_> = properties.iter().collect();
        assert_eq!(pairs, vec![("B", "3"), ("A", "2")]);
        assert_eq!(properties.get("A"), Some("2"));
        assert_eq!(properties.get("C"), None);
    }
}
