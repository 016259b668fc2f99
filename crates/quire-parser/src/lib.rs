//! Document parsing for quire.
//!
//! Turns the raw bytes of a content document into a [`ParsedDocument`]:
//! the typed front matter, a syntax tree of the markdown body, and the
//! derived title and description.
//!
//! Parsing is a pure function of its input. The same bytes always produce
//! the same document, which lets the build run it on any thread.
//!
//! # Example
//!
//! ```
//! use quire_parser::parse_document;
//!
//! let doc = parse_document(b"---\nsidebar_position: 1\n---\n# Patterns\n\nCommon shapes.\n").unwrap();
//! assert_eq!(doc.title.as_deref(), Some("Patterns"));
//! assert_eq!(doc.description.as_deref(), Some("Common shapes."));
//! assert_eq!(doc.front_matter.sidebar_position, Some(1.0));
//! ```

mod ast;
mod frontmatter;
mod parser;

pub use ast::{Alignment, Block, CodeLanguage, Inline, ListItem, plain_text};
pub use frontmatter::{FrontMatter, split_front_matter};
pub use parser::parse_markdown;

/// Error raised while parsing a single document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source bytes are not UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
    /// Front matter block is unterminated, not YAML, or not a mapping.
    #[error("malformed front matter: {0}")]
    MalformedFrontMatter(String),
}

/// A parsed content document.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedDocument {
    /// Body syntax tree.
    pub ast: Vec<Block>,
    /// Front matter; default when the document has none.
    pub front_matter: FrontMatter,
    /// Front matter title, else the text of the first level-1 heading.
    pub title: Option<String>,
    /// Front matter description, else the text of the first paragraph.
    pub description: Option<String>,
}

/// Parse raw document bytes.
pub fn parse_document(source: &[u8]) -> Result<ParsedDocument, ParseError> {
    let text = std::str::from_utf8(source)?;
    parse_text(text)
}

/// Parse document text.
pub fn parse_text(text: &str) -> Result<ParsedDocument, ParseError> {
    let (yaml, body) = split_front_matter(text)?;
    let front_matter = match yaml {
        Some(yaml) => FrontMatter::from_yaml(yaml)?,
        None => FrontMatter::default(),
    };

    let ast = parse_markdown(body);

    let title = front_matter
        .title
        .clone()
        .or_else(|| first_heading_text(&ast));
    let description = front_matter
        .description
        .clone()
        .or_else(|| first_paragraph_text(&ast));

    Ok(ParsedDocument {
        ast,
        front_matter,
        title,
        description,
    })
}

fn first_heading_text(ast: &[Block]) -> Option<String> {
    ast.iter().find_map(|block| match block {
        Block::Heading {
            level: 1, content, ..
        } => Some(plain_text(content).trim().to_owned()),
        _ => None,
    })
}

fn first_paragraph_text(ast: &[Block]) -> Option<String> {
    ast.iter().find_map(|block| match block {
        Block::Paragraph(content) => {
            let text = plain_text(content);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_owned())
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_from_first_h1() {
        let doc = parse_text("Intro text.\n\n# Longest Common Subsequence\n\n## Goal\n").unwrap();
        assert_eq!(doc.title.as_deref(), Some("Longest Common Subsequence"));
        assert_eq!(doc.description.as_deref(), Some("Intro text."));
    }

    #[test]
    fn test_front_matter_wins() {
        let doc = parse_text("---\ntitle: LCS\ndescription: Short.\n---\n# Long Title\n\nBody.\n")
            .unwrap();
        assert_eq!(doc.title.as_deref(), Some("LCS"));
        assert_eq!(doc.description.as_deref(), Some("Short."));
    }

    #[test]
    fn test_no_title_or_description() {
        let doc = parse_text("## Only h2\n").unwrap();
        assert_eq!(doc.title, None);
        assert_eq!(doc.description, None);
        assert_eq!(doc.front_matter, FrontMatter::default());
    }

    #[test]
    fn test_description_skips_image_only_paragraph() {
        let doc = parse_text("# T\n\n<img src=\"a.png\"/>\n\nReal text.\n").unwrap();
        assert_eq!(doc.description.as_deref(), Some("Real text."));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = parse_document(&[0x23, 0x20, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidEncoding(_)));
    }

    #[test]
    fn test_malformed_front_matter() {
        let err = parse_text("---\ntitle: [\n---\nBody\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedFrontMatter(_)));
    }

    #[test]
    fn test_deterministic() {
        let source = "---\ntags: [a]\n---\n# T\n\n## Goal\n\n## Goal\n\n```py\nx = 1\n```\n";
        assert_eq!(parse_text(source).unwrap(), parse_text(source).unwrap());
    }
}
