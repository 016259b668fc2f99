//! Document syntax tree.
//!
//! Block and inline nodes mirror the markdown constructs the site renders.
//! The tree owns all of its text so it can cross thread boundaries freely.

use std::collections::BTreeMap;

/// Block-level node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Explicit anchor from `{#id}` syntax.
        id: Option<String>,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    /// Inline content directly inside a tight list item.
    Plain(Vec<Inline>),
    CodeBlock {
        language: CodeLanguage,
        /// `key=value` pairs from the fence info string.
        meta: BTreeMap<String, String>,
        code: String,
    },
    List {
        ordered: bool,
        /// First number of an ordered list.
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    BlockQuote(Vec<Block>),
    ThematicBreak,
    Html(String),
}

/// One list item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListItem {
    /// Task list state; `None` for ordinary items.
    pub checked: Option<bool>,
    pub blocks: Vec<Block>,
}

/// Inline node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        href: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        title: String,
        alt: String,
    },
    Html(String),
    SoftBreak,
    HardBreak,
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value, if any.
    #[must_use]
    pub fn as_css(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

/// Language tag of a fenced code block.
///
/// Unknown tags are kept as written; a missing tag is plain text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CodeLanguage {
    #[default]
    PlainText,
    Named(String),
}

impl CodeLanguage {
    /// Identifier used in class names and payloads.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlainText => "text",
            Self::Named(name) => name,
        }
    }

    pub(crate) fn from_tag(tag: &str) -> Self {
        if tag.is_empty() {
            Self::PlainText
        } else {
            Self::Named(tag.to_owned())
        }
    }
}

/// Concatenate the visible text of inline nodes.
///
/// Breaks become single spaces; images contribute their alt text.
#[must_use]
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link {
                content: children, ..
            } => push_plain_text(children, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::Html(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_nested() {
        let inlines = vec![
            Inline::Text("Use ".to_owned()),
            Inline::Code("dp[i]".to_owned()),
            Inline::SoftBreak,
            Inline::Strong(vec![Inline::Emphasis(vec![Inline::Text(
                "carefully".to_owned(),
            )])]),
            Inline::Html("<br/>".to_owned()),
        ];
        assert_eq!(plain_text(&inlines), "Use dp[i] carefully");
    }

    #[test]
    fn test_code_language_tag() {
        assert_eq!(CodeLanguage::from_tag("").as_str(), "text");
        assert_eq!(CodeLanguage::from_tag("python").as_str(), "python");
        assert_eq!(CodeLanguage::from_tag("weird-lang").as_str(), "weird-lang");
    }
}
