//! Markdown event stream to [`Block`] tree.
//!
//! Walks pulldown-cmark events with an explicit stack of open containers.
//! Each `Start` pushes a [`Frame`]; the matching `End` pops it and attaches
//! the finished node to whatever container is now on top.

use std::collections::BTreeMap;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::ast::{Alignment, Block, CodeLanguage, Inline, ListItem};

/// Markdown extensions enabled for documents.
pub(crate) fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse a markdown body (front matter already removed).
pub fn parse_markdown(body: &str) -> Vec<Block> {
    let mut builder = AstBuilder::default();
    for event in Parser::new_ext(body, markdown_options()) {
        builder.process_event(event);
    }
    builder.finish()
}

/// Parse fence info string into language and attributes.
///
/// `python title="main.py"` → (`python`, {`title`: `main.py`}).
pub(crate) fn parse_fence_info(info: &str) -> (String, BTreeMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = BTreeMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn convert_alignment(alignment: pulldown_cmark::Alignment) -> Alignment {
    match alignment {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}

/// An open container.
enum Frame {
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        id: Option<String>,
        content: Vec<Inline>,
    },
    BlockQuote(Vec<Block>),
    CodeBlock {
        language: CodeLanguage,
        meta: BTreeMap<String, String>,
        code: String,
    },
    HtmlBlock(String),
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(ListItem),
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    TableRow(Vec<Vec<Inline>>),
    TableCell(Vec<Inline>),
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
    /// Unsupported container; its content goes to the enclosing frame.
    Passthrough,
}

#[derive(Default)]
struct AstBuilder {
    root: Vec<Block>,
    stack: Vec<Frame>,
}

impl AstBuilder {
    fn finish(mut self) -> Vec<Block> {
        // Well-formed event streams close every frame; drain anything left.
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.into_string())),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::ThematicBreak),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push_inline(Inline::Text(math.into_string()));
            }
            Event::FootnoteReference(name) => {
                self.push_inline(Inline::Text(format!("[^{name}]")));
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading { level, id, .. } => Frame::Heading {
                level: heading_level_to_num(level),
                id: id.map(pulldown_cmark::CowStr::into_string),
                content: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::BlockQuote(Vec::new()),
            Tag::CodeBlock(kind) => {
                let (language, meta) = match kind {
                    CodeBlockKind::Fenced(info) => parse_fence_info(&info),
                    CodeBlockKind::Indented => (String::new(), BTreeMap::new()),
                };
                Frame::CodeBlock {
                    language: CodeLanguage::from_tag(&language),
                    meta,
                    code: String::new(),
                }
            }
            Tag::HtmlBlock => Frame::HtmlBlock(String::new()),
            Tag::List(start) => Frame::List {
                start,
                items: Vec::new(),
            },
            Tag::Item => Frame::Item(ListItem::default()),
            Tag::Table(alignments) => Frame::Table {
                alignments: alignments.into_iter().map(convert_alignment).collect(),
                head: Vec::new(),
                rows: Vec::new(),
            },
            Tag::TableHead | Tag::TableRow => Frame::TableRow(Vec::new()),
            Tag::TableCell => Frame::TableCell(Vec::new()),
            Tag::Emphasis => Frame::Emphasis(Vec::new()),
            Tag::Strong => Frame::Strong(Vec::new()),
            Tag::Strikethrough => Frame::Strikethrough(Vec::new()),
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                href: dest_url.into_string(),
                title: title.into_string(),
                content: Vec::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.into_string(),
                title: title.into_string(),
                alt: String::new(),
            },
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => Frame::Passthrough,
        };
        self.stack.push(frame);
    }

    /// Pop the innermost frame and attach its node to the parent.
    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph(content) => self.push_block(Block::Paragraph(content)),
            Frame::Heading { level, id, content } => {
                self.push_block(Block::Heading { level, id, content });
            }
            Frame::BlockQuote(blocks) => self.push_block(Block::BlockQuote(blocks)),
            Frame::CodeBlock {
                language,
                meta,
                code,
            } => self.push_block(Block::CodeBlock {
                language,
                meta,
                code,
            }),
            Frame::HtmlBlock(html) => self.push_block(Block::Html(html)),
            Frame::List { start, items } => self.push_block(Block::List {
                ordered: start.is_some(),
                start,
                items,
            }),
            Frame::Item(item) => {
                if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                    items.push(item);
                }
            }
            Frame::Table {
                alignments,
                head,
                rows,
            } => self.push_block(Block::Table {
                alignments,
                head,
                rows,
            }),
            Frame::TableRow(cells) => {
                if let Some(Frame::Table { head, rows, .. }) = self.stack.last_mut() {
                    // The header row arrives before any body row.
                    if head.is_empty() && rows.is_empty() {
                        *head = cells;
                    } else {
                        rows.push(cells);
                    }
                }
            }
            Frame::TableCell(content) => {
                if let Some(Frame::TableRow(cells)) = self.stack.last_mut() {
                    cells.push(content);
                }
            }
            Frame::Emphasis(content) => self.push_inline(Inline::Emphasis(content)),
            Frame::Strong(content) => self.push_inline(Inline::Strong(content)),
            Frame::Strikethrough(content) => self.push_inline(Inline::Strikethrough(content)),
            Frame::Link {
                href,
                title,
                content,
            } => self.push_inline(Inline::Link {
                href,
                title,
                content,
            }),
            Frame::Image { src, title, alt } => self.push_inline(Inline::Image { src, title, alt }),
            Frame::Passthrough => {}
        }
    }

    /// Innermost frame that accepts content.
    fn target(&mut self) -> Option<&mut Frame> {
        self.stack
            .iter_mut()
            .rev()
            .find(|frame| !matches!(frame, Frame::Passthrough))
    }

    fn push_block(&mut self, block: Block) {
        match self.target() {
            Some(Frame::BlockQuote(blocks) | Frame::Item(ListItem { blocks, .. })) => {
                blocks.push(block);
            }
            _ => self.root.push(block),
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.target() {
            Some(
                Frame::Paragraph(content)
                | Frame::Heading { content, .. }
                | Frame::TableCell(content)
                | Frame::Emphasis(content)
                | Frame::Strong(content)
                | Frame::Strikethrough(content)
                | Frame::Link { content, .. },
            ) => content.push(inline),
            Some(Frame::Image { alt, .. }) => {
                alt.push_str(&crate::ast::plain_text(std::slice::from_ref(&inline)));
            }
            Some(Frame::CodeBlock { code, .. }) => {
                code.push_str(&crate::ast::plain_text(std::slice::from_ref(&inline)));
            }
            Some(Frame::HtmlBlock(html)) => {
                if let Inline::Html(fragment) | Inline::Text(fragment) = inline {
                    html.push_str(&fragment);
                }
            }
            Some(Frame::Item(ListItem { blocks, .. }) | Frame::BlockQuote(blocks)) => {
                if let Some(Block::Plain(content)) = blocks.last_mut() {
                    content.push(inline);
                } else {
                    blocks.push(Block::Plain(vec![inline]));
                }
            }
            _ => {
                if let Some(Block::Plain(content)) = self.root.last_mut() {
                    content.push(inline);
                } else {
                    self.root.push(Block::Plain(vec![inline]));
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(Frame::CodeBlock { code, .. }) = self.target() {
            code.push_str(text);
            return;
        }
        self.push_inline(Inline::Text(text.to_owned()));
    }

    fn html(&mut self, html: &str) {
        if let Some(Frame::HtmlBlock(buffer)) = self.target() {
            buffer.push_str(html);
            return;
        }
        self.push_inline(Inline::Html(html.to_owned()));
    }

    fn task_list_marker(&mut self, checked: bool) {
        if let Some(Frame::Item(item)) = self
            .stack
            .iter_mut()
            .rev()
            .find(|frame| matches!(frame, Frame::Item(_)))
        {
            item.checked = Some(checked);
        }
    }
}
