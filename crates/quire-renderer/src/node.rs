//! Renderable node tree.
//!
//! Serialized into the hydration payload; the client runtime re-renders
//! from these nodes, so each variant carries everything it needs.

use std::collections::BTreeMap;

use serde::Serialize;

/// A renderable node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderNode {
    Heading {
        level: u8,
        id: String,
        children: Vec<RenderNode>,
    },
    Paragraph {
        children: Vec<RenderNode>,
    },
    CodeBlock {
        /// Language tag; `text` when the fence had none.
        language: String,
        code: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        meta: BTreeMap<String, String>,
    },
    List {
        ordered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        items: Vec<ListItemNode>,
    },
    Table {
        /// CSS `text-align` per column.
        alignments: Vec<Option<&'static str>>,
        head: Vec<Vec<RenderNode>>,
        rows: Vec<Vec<Vec<RenderNode>>>,
    },
    BlockQuote {
        children: Vec<RenderNode>,
    },
    ThematicBreak,
    Html {
        value: String,
    },
    InlineText {
        value: String,
    },
    InlineCode {
        value: String,
    },
    Emphasis {
        children: Vec<RenderNode>,
    },
    Strong {
        children: Vec<RenderNode>,
    },
    Strikethrough {
        children: Vec<RenderNode>,
    },
    Link {
        href: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        title: String,
        children: Vec<RenderNode>,
    },
    Image {
        src: String,
        alt: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        title: String,
    },
    SoftBreak,
    HardBreak,
}

/// A list item's content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListItemNode {
    /// Task list checkbox state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    pub children: Vec<RenderNode>,
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading text.
    pub value: String,
    /// Anchor ID for linking.
    pub id: String,
    /// Heading level (1-6).
    pub level: u8,
}
