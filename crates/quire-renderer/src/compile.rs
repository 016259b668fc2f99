//! Syntax tree to render-node compilation.

use quire_parser::{Block, Inline, ListItem, plain_text};

use crate::anchor::AnchorRegistry;
use crate::node::{ListItemNode, RenderNode, TocEntry};

/// Heading levels included in the table of contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TocRange {
    pub min_level: u8,
    pub max_level: u8,
}

impl Default for TocRange {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 3,
        }
    }
}

impl TocRange {
    #[must_use]
    pub fn contains(self, level: u8) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }

    /// Apply per-document overrides, keeping the range non-empty.
    #[must_use]
    pub fn with_overrides(self, min_level: Option<u8>, max_level: Option<u8>) -> Self {
        let min_level = min_level.unwrap_or(self.min_level).clamp(1, 6);
        let max_level = max_level.unwrap_or(self.max_level).clamp(min_level, 6);
        Self {
            min_level,
            max_level,
        }
    }
}

/// Result of compiling one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledDocument {
    pub nodes: Vec<RenderNode>,
    pub toc: Vec<TocEntry>,
}

/// Compile a document body into render nodes and its table of contents.
///
/// Every heading receives a document-unique anchor; only headings inside
/// `toc_range` appear in the table of contents. The output depends on
/// nothing but the arguments.
#[must_use]
pub fn compile(ast: &[Block], toc_range: TocRange) -> CompiledDocument {
    let mut compiler = Compiler {
        anchors: AnchorRegistry::default(),
        toc: Vec::new(),
        toc_range,
    };
    let mut nodes = Vec::with_capacity(ast.len());
    compiler.blocks(ast, &mut nodes);
    CompiledDocument {
        nodes,
        toc: compiler.toc,
    }
}

struct Compiler {
    anchors: AnchorRegistry,
    toc: Vec<TocEntry>,
    toc_range: TocRange,
}

impl Compiler {
    fn blocks(&mut self, blocks: &[Block], out: &mut Vec<RenderNode>) {
        for block in blocks {
            self.block(block, out);
        }
    }

    fn block(&mut self, block: &Block, out: &mut Vec<RenderNode>) {
        let node = match block {
            Block::Heading { level, id, content } => self.heading(*level, id.as_deref(), content),
            Block::Paragraph(content) => RenderNode::Paragraph {
                children: inlines(content),
            },
            Block::Plain(content) => {
                out.extend(inlines(content));
                return;
            }
            Block::CodeBlock {
                language,
                meta,
                code,
            } => RenderNode::CodeBlock {
                language: language.as_str().to_owned(),
                code: code.clone(),
                meta: meta.clone(),
            },
            Block::List {
                ordered,
                start,
                items,
            } => RenderNode::List {
                ordered: *ordered,
                start: *start,
                items: items.iter().map(|item| self.list_item(item)).collect(),
            },
            Block::Table {
                alignments,
                head,
                rows,
            } => RenderNode::Table {
                alignments: alignments.iter().map(|a| a.as_css()).collect(),
                head: head.iter().map(|cell| inlines(cell)).collect(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| inlines(cell)).collect())
                    .collect(),
            },
            Block::BlockQuote(children) => {
                let mut nodes = Vec::new();
                self.blocks(children, &mut nodes);
                RenderNode::BlockQuote { children: nodes }
            }
            Block::ThematicBreak => RenderNode::ThematicBreak,
            Block::Html(html) => RenderNode::Html {
                value: html.clone(),
            },
        };
        out.push(node);
    }

    fn heading(&mut self, level: u8, explicit_id: Option<&str>, content: &[Inline]) -> RenderNode {
        let text = plain_text(content);
        let text = text.trim();
        let id = match explicit_id {
            Some(id) => self.anchors.explicit(id),
            None => self.anchors.generate(text),
        };

        if self.toc_range.contains(level) {
            self.toc.push(TocEntry {
                value: text.to_owned(),
                id: id.clone(),
                level,
            });
        }

        RenderNode::Heading {
            level,
            id,
            children: inlines(content),
        }
    }

    fn list_item(&mut self, item: &ListItem) -> ListItemNode {
        let mut children = Vec::new();
        self.blocks(&item.blocks, &mut children);
        ListItemNode {
            checked: item.checked,
            children,
        }
    }
}

fn inlines(content: &[Inline]) -> Vec<RenderNode> {
    content.iter().map(inline).collect()
}

fn inline(node: &Inline) -> RenderNode {
    match node {
        Inline::Text(value) => RenderNode::InlineText {
            value: value.clone(),
        },
        Inline::Code(value) => RenderNode::InlineCode {
            value: value.clone(),
        },
        Inline::Emphasis(children) => RenderNode::Emphasis {
            children: inlines(children),
        },
        Inline::Strong(children) => RenderNode::Strong {
            children: inlines(children),
        },
        Inline::Strikethrough(children) => RenderNode::Strikethrough {
            children: inlines(children),
        },
        Inline::Link {
            href,
            title,
            content,
        } => RenderNode::Link {
            href: href.clone(),
            title: title.clone(),
            children: inlines(content),
        },
        Inline::Image { src, title, alt } => RenderNode::Image {
            src: src.clone(),
            alt: alt.clone(),
            title: title.clone(),
        },
        Inline::Html(value) => RenderNode::Html {
            value: value.clone(),
        },
        Inline::SoftBreak => RenderNode::SoftBreak,
        Inline::HardBreak => RenderNode::HardBreak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_parser::parse_markdown;

    fn compile_md(markdown: &str) -> CompiledDocument {
        compile(&parse_markdown(markdown), TocRange::default())
    }

    fn toc_ids(doc: &CompiledDocument) -> Vec<&str> {
        doc.toc.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn test_duplicate_headings_get_distinct_ids() {
        let doc = compile_md("# Title\n\n## Goal\n\ntext\n\n## Goal\n");
        assert_eq!(
            doc.toc,
            vec![
                TocEntry {
                    value: "Goal".to_owned(),
                    id: "goal".to_owned(),
                    level: 2,
                },
                TocEntry {
                    value: "Goal".to_owned(),
                    id: "goal-1".to_owned(),
                    level: 2,
                },
            ]
        );
    }

    #[test]
    fn test_h1_has_id_but_not_in_toc() {
        let doc = compile_md("# Longest Common Subsequence\n\n## Approach\n");
        assert!(matches!(
            &doc.nodes[0],
            RenderNode::Heading { level: 1, id, .. } if id == "longest-common-subsequence"
        ));
        assert_eq!(toc_ids(&doc), vec!["approach"]);
    }

    #[test]
    fn test_toc_range() {
        let md = "## Two\n\n### Three\n\n#### Four\n";
        assert_eq!(toc_ids(&compile_md(md)), vec!["two", "three"]);

        let range = TocRange::default().with_overrides(None, Some(4));
        let doc = compile(&parse_markdown(md), range);
        assert_eq!(toc_ids(&doc), vec!["two", "three", "four"]);
    }

    #[test]
    fn test_toc_range_overrides_clamped() {
        let range = TocRange::default().with_overrides(Some(4), Some(2));
        assert_eq!(
            range,
            TocRange {
                min_level: 4,
                max_level: 4,
            }
        );
    }

    #[test]
    fn test_explicit_heading_id() {
        let doc = compile_md("## Goal {#objective}\n\n## Objective\n");
        assert_eq!(toc_ids(&doc), vec!["objective", "objective-1"]);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let doc = compile_md("## Use `dp` table\n");
        assert_eq!(doc.toc[0].value, "Use dp table");
        assert_eq!(doc.toc[0].id, "use-dp-table");
    }

    #[test]
    fn test_code_block_languages() {
        let doc = compile_md("```python\nx = 1\n```\n\n```\nplain\n```\n\n```unknownlang\n?\n```\n");
        let languages: Vec<&str> = doc
            .nodes
            .iter()
            .filter_map(|node| match node {
                RenderNode::CodeBlock { language, .. } => Some(language.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(languages, vec!["python", "text", "unknownlang"]);
    }

    #[test]
    fn test_tight_list_items_hold_inlines() {
        let doc = compile_md("- one\n");
        assert_eq!(
            doc.nodes,
            vec![RenderNode::List {
                ordered: false,
                start: None,
                items: vec![ListItemNode {
                    checked: None,
                    children: vec![RenderNode::InlineText {
                        value: "one".to_owned(),
                    }],
                }],
            }]
        );
    }

    #[test]
    fn test_headings_in_blockquote_share_registry() {
        let doc = compile_md("## Note\n\n> ## Note\n");
        assert_eq!(toc_ids(&doc), vec!["note", "note-1"]);
    }

    #[test]
    fn test_idempotent() {
        let ast = parse_markdown("## A\n\n## A\n\n| x |\n|---|\n| 1 |\n\n1. a\n2. b\n");
        let first = compile(&ast, TocRange::default());
        let second = compile(&ast, TocRange::default());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.nodes).unwrap(),
            serde_json::to_string(&second.nodes).unwrap()
        );
    }

    #[test]
    fn test_serialized_shape() {
        let doc = compile_md("```python\nprint(1)\n```\n");
        let json = serde_json::to_value(&doc.nodes).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"type": "codeBlock", "language": "python", "code": "print(1)\n"}])
        );
    }
}
