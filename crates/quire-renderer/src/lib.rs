//! Document compilation for quire.
//!
//! Compiles a parsed document body into [`RenderNode`]s plus its table of
//! contents, and renders those nodes to static HTML.
//!
//! # Example
//!
//! ```
//! use quire_parser::parse_markdown;
//! use quire_renderer::{TocRange, compile, render_html};
//!
//! let ast = parse_markdown("## Goal\n\n## Goal\n");
//! let doc = compile(&ast, TocRange::default());
//!
//! let ids: Vec<_> = doc.toc.iter().map(|entry| entry.id.as_str()).collect();
//! assert_eq!(ids, ["goal", "goal-1"]);
//! assert!(render_html(&doc.nodes).starts_with(r#"<h2 id="goal">"#));
//! ```

mod anchor;
mod compile;
mod html;
mod node;

pub use anchor::{AnchorRegistry, escape_html, slugify};
pub use compile::{CompiledDocument, TocRange, compile};
pub use html::{plain_text, render_html};
pub use node::{ListItemNode, RenderNode, TocEntry};
