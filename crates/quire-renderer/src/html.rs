//! Static HTML for render nodes.
//!
//! Produces semantic HTML5 matching what the client runtime hydrates:
//! headings carry their anchor ids and code blocks a `language-*` class.

use std::fmt::Write;

use crate::anchor::escape_html;
use crate::node::{ListItemNode, RenderNode};

/// Render nodes to an HTML fragment.
#[must_use]
pub fn render_html(nodes: &[RenderNode]) -> String {
    let mut out = String::with_capacity(4096);
    push_nodes(nodes, &mut out);
    out
}

/// Visible text of the nodes, block boundaries separated by newlines.
///
/// Used for search entries; raw HTML is dropped.
#[must_use]
pub fn plain_text(nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    push_text(nodes, &mut out);
    out.trim().to_owned()
}

fn push_nodes(nodes: &[RenderNode], out: &mut String) {
    for node in nodes {
        push_node(node, out);
    }
}

fn push_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Heading {
            level,
            id,
            children,
        } => {
            let _ = write!(out, r#"<h{level} id="{}">"#, escape_html(id));
            push_nodes(children, out);
            let _ = write!(out, "</h{level}>");
        }
        RenderNode::Paragraph { children } => wrap("p", children, out),
        RenderNode::CodeBlock { language, code, .. } => {
            let _ = write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(language),
                escape_html(code)
            );
        }
        RenderNode::List {
            ordered,
            start,
            items,
        } => {
            match (ordered, start) {
                (true, Some(n)) if *n != 1 => {
                    let _ = write!(out, r#"<ol start="{n}">"#);
                }
                (true, _) => out.push_str("<ol>"),
                (false, _) => out.push_str("<ul>"),
            }
            for item in items {
                push_list_item(item, out);
            }
            out.push_str(if *ordered { "</ol>" } else { "</ul>" });
        }
        RenderNode::Table {
            alignments,
            head,
            rows,
        } => {
            out.push_str("<table><thead><tr>");
            for (index, cell) in head.iter().enumerate() {
                push_cell("th", alignments.get(index).copied().flatten(), cell, out);
            }
            out.push_str("</tr></thead><tbody>");
            for row in rows {
                out.push_str("<tr>");
                for (index, cell) in row.iter().enumerate() {
                    push_cell("td", alignments.get(index).copied().flatten(), cell, out);
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
        }
        RenderNode::BlockQuote { children } => wrap("blockquote", children, out),
        RenderNode::ThematicBreak => out.push_str("<hr>"),
        RenderNode::Html { value } => out.push_str(value),
        RenderNode::InlineText { value } => out.push_str(&escape_html(value)),
        RenderNode::InlineCode { value } => {
            let _ = write!(out, "<code>{}</code>", escape_html(value));
        }
        RenderNode::Emphasis { children } => wrap("em", children, out),
        RenderNode::Strong { children } => wrap("strong", children, out),
        RenderNode::Strikethrough { children } => wrap("s", children, out),
        RenderNode::Link {
            href,
            title,
            children,
        } => {
            let _ = write!(out, r#"<a href="{}""#, escape_html(href));
            if !title.is_empty() {
                let _ = write!(out, r#" title="{}""#, escape_html(title));
            }
            out.push('>');
            push_nodes(children, out);
            out.push_str("</a>");
        }
        RenderNode::Image { src, alt, title } => {
            let _ = write!(out, r#"<img src="{}""#, escape_html(src));
            if !title.is_empty() {
                let _ = write!(out, r#" title="{}""#, escape_html(title));
            }
            let _ = write!(out, r#" alt="{}">"#, escape_html(alt));
        }
        RenderNode::SoftBreak => out.push('\n'),
        RenderNode::HardBreak => out.push_str("<br>"),
    }
}

fn wrap(tag: &str, children: &[RenderNode], out: &mut String) {
    let _ = write!(out, "<{tag}>");
    push_nodes(children, out);
    let _ = write!(out, "</{tag}>");
}

fn push_list_item(item: &ListItemNode, out: &mut String) {
    out.push_str("<li>");
    match item.checked {
        Some(true) => out.push_str(r#"<input type="checkbox" checked disabled> "#),
        Some(false) => out.push_str(r#"<input type="checkbox" disabled> "#),
        None => {}
    }
    push_nodes(&item.children, out);
    out.push_str("</li>");
}

fn push_cell(tag: &str, align: Option<&str>, cell: &[RenderNode], out: &mut String) {
    match align {
        Some(align) => {
            let _ = write!(out, r#"<{tag} style="text-align:{align}">"#);
        }
        None => {
            let _ = write!(out, "<{tag}>");
        }
    }
    push_nodes(cell, out);
    let _ = write!(out, "</{tag}>");
}

fn push_text(nodes: &[RenderNode], out: &mut String) {
    for node in nodes {
        match node {
            RenderNode::Heading { children, .. }
            | RenderNode::Paragraph { children }
            | RenderNode::BlockQuote { children } => {
                push_text(children, out);
                out.push('\n');
            }
            RenderNode::CodeBlock { code, .. } => {
                out.push_str(code);
                if !code.ends_with('\n') {
                    out.push('\n');
                }
            }
            RenderNode::List { items, .. } => {
                for item in items {
                    push_text(&item.children, out);
                    out.push('\n');
                }
            }
            RenderNode::Table { head, rows, .. } => {
                for row in std::iter::once(head).chain(rows) {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|cell| {
                            let mut text = String::new();
                            push_text(cell, &mut text);
                            text
                        })
                        .collect();
                    out.push_str(&cells.join(" "));
                    out.push('\n');
                }
            }
            RenderNode::InlineText { value } | RenderNode::InlineCode { value } => {
                out.push_str(value);
            }
            RenderNode::Emphasis { children }
            | RenderNode::Strong { children }
            | RenderNode::Strikethrough { children }
            | RenderNode::Link { children, .. } => push_text(children, out),
            RenderNode::Image { alt, .. } => out.push_str(alt),
            RenderNode::SoftBreak | RenderNode::HardBreak => out.push(' '),
            RenderNode::ThematicBreak | RenderNode::Html { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{TocRange, compile};
    use pretty_assertions::assert_eq;
    use quire_parser::parse_markdown;

    fn html(markdown: &str) -> String {
        render_html(&compile(&parse_markdown(markdown), TocRange::default()).nodes)
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(html("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id() {
        assert_eq!(
            html("## Goal\n\n## Goal"),
            r#"<h2 id="goal">Goal</h2><h2 id="goal-1">Goal</h2>"#
        );
    }

    #[test]
    fn test_code_block_class() {
        assert_eq!(
            html("```python\nif a < b:\n```"),
            r#"<pre><code class="language-python">if a &lt; b:
</code></pre>"#
        );
        assert!(html("```\nx\n```").contains(r#"class="language-text""#));
    }

    #[test]
    fn test_lists() {
        assert_eq!(html("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(html("1. a\n2. b"), "<ol><li>a</li><li>b</li></ol>");
        assert_eq!(html("5. a"), r#"<ol start="5"><li>a</li></ol>"#);
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            html("- [x] done"),
            r#"<ul><li><input type="checkbox" checked disabled> done</li></ul>"#
        );
    }

    #[test]
    fn test_table_alignment() {
        assert_eq!(
            html("| a | b |\n|:-:|---|\n| 1 | 2 |"),
            concat!(
                r#"<table><thead><tr><th style="text-align:center">a</th><th>b</th></tr></thead>"#,
                r#"<tbody><tr><td style="text-align:center">1</td><td>2</td></tr></tbody></table>"#
            )
        );
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            html("**bold** *em* ~~gone~~ `code` [link](/docs/intro)"),
            r#"<p><strong>bold</strong> <em>em</em> <s>gone</s> <code>code</code> <a href="/docs/intro">link</a></p>"#
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            html(r#"![diagram](./d.png "Table")"#),
            r#"<p><img src="./d.png" title="Table" alt="diagram"></p>"#
        );
    }

    #[test]
    fn test_text_escaped() {
        assert_eq!(html("a <b> & c"), "<p>a <b> &amp; c</p>");
    }

    #[test]
    fn test_plain_text() {
        let doc = compile(
            &parse_markdown("# Title\n\nSome **bold** text.\n\n```py\nx = 1\n```\n\n- a\n- b\n"),
            TocRange::default(),
        );
        assert_eq!(
            plain_text(&doc.nodes),
            "Title\nSome bold text.\nx = 1\na\nb"
        );
    }
}
