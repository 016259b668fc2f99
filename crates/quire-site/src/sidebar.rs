//! Sidebar configuration and navigation tree building.
//!
//! A sidebar file maps sidebar names to item lists. Items are doc ids,
//! external links, categories, or `autogenerated` directives that expand a
//! content directory into links and nested categories.
//!
//! ```yaml
//! docsSidebar:
//!   - intro
//!   - type: category
//!     label: Dynamic Programming
//!     link: { type: doc, id: dp/index }
//!     items:
//!       - type: autogenerated
//!         dirName: dp
//!   - type: link
//!     label: GitHub
//!     href: https://github.com/acme/handbook
//! ```
//!
//! Autogenerated items are ordered by [`SidebarOrdering`]. Directory labels
//! come from `_category_.yaml` when present, else from the title-cased
//! directory name. A directory's `index.md` (or `README.md`) becomes the
//! category's own link instead of a child item.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quire_config::{SidebarConfig, SidebarOrdering};

use crate::document::Document;
use crate::error::{NavigationError, SiteError};

/// Parsed sidebar file: sidebar name → items.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SidebarsConfig(pub BTreeMap<String, Vec<SidebarItemConfig>>);

impl SidebarsConfig {
    /// Parse a sidebar file.
    pub fn from_yaml(content: &str) -> Result<Self, NavigationError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| NavigationError::MalformedConfig(e.to_string()))
    }

    /// A single sidebar autogenerated from the content root.
    #[must_use]
    pub fn autogenerated(name: &str) -> Self {
        Self(BTreeMap::from([(
            name.to_owned(),
            vec![SidebarItemConfig::Item(SidebarItemSpec::Autogenerated {
                dir_name: ".".to_owned(),
            })],
        )]))
    }
}

/// A sidebar item as written: a bare doc id or a typed mapping.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SidebarItemConfig {
    DocId(String),
    Item(SidebarItemSpec),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarItemSpec {
    Doc {
        id: String,
        label: Option<String>,
    },
    Link {
        href: String,
        label: String,
    },
    Category {
        label: String,
        #[serde(default)]
        items: Vec<SidebarItemConfig>,
        collapsible: Option<bool>,
        collapsed: Option<bool>,
        link: Option<CategoryLinkConfig>,
    },
    Autogenerated {
        #[serde(rename = "dirName")]
        dir_name: String,
    },
}

/// Document a category links to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CategoryLinkConfig {
    Doc { id: String },
}

/// Contents of a directory's `_category_.yaml`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryMetadata {
    pub label: Option<String>,
    pub position: Option<f64>,
    pub collapsible: Option<bool>,
    pub collapsed: Option<bool>,
    pub description: Option<String>,
}

impl CategoryMetadata {
    /// Parse category metadata for directory `dir`.
    pub fn from_yaml(dir: &str, content: &str) -> Result<Self, NavigationError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| NavigationError::MalformedCategory {
            dir: dir.to_owned(),
            message: e.to_string(),
        })
    }
}

/// A node of a built sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarNode {
    #[serde(rename_all = "camelCase")]
    Link {
        label: String,
        href: String,
        /// Back-reference to the linked document, by id.
        #[serde(skip_serializing_if = "Option::is_none")]
        doc_id: Option<String>,
        unlisted: bool,
    },
    Category {
        label: String,
        collapsible: bool,
        collapsed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<CategoryLink>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        items: Vec<SidebarNode>,
    },
}

/// Resolved category link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLink {
    pub doc_id: String,
    pub href: String,
}

/// One step of a document's breadcrumb trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Inputs shared by every sidebar of a version.
pub struct SidebarContext<'a> {
    pub version: &'a str,
    pub docs: &'a BTreeMap<String, Document>,
    /// Category metadata by directory, relative to the content root.
    pub categories: &'a BTreeMap<String, CategoryMetadata>,
    pub defaults: SidebarConfig,
}

/// Build every configured sidebar of a version.
///
/// All unresolved items are reported, not just the first.
pub fn build_sidebars(
    config: &SidebarsConfig,
    ctx: &SidebarContext<'_>,
) -> Result<BTreeMap<String, Vec<SidebarNode>>, Vec<SiteError>> {
    let mut errors = Vec::new();
    let mut sidebars = BTreeMap::new();

    for (name, items) in &config.0 {
        let mut builder = SidebarBuilder {
            ctx,
            sidebar: name,
            errors: &mut errors,
        };
        let nodes = builder.items(items);
        tracing::debug!(version = ctx.version, sidebar = %name, items = nodes.len(), "Built sidebar");
        sidebars.insert(name.clone(), nodes);
    }

    if errors.is_empty() {
        Ok(sidebars)
    } else {
        Err(errors)
    }
}

struct SidebarBuilder<'a, 'b> {
    ctx: &'a SidebarContext<'a>,
    sidebar: &'a str,
    errors: &'b mut Vec<SiteError>,
}

impl<'a> SidebarBuilder<'a, '_> {
    fn items(&mut self, items: &[SidebarItemConfig]) -> Vec<SidebarNode> {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SidebarItemConfig::DocId(id) => nodes.extend(self.doc_link(id, None)),
                SidebarItemConfig::Item(spec) => self.spec(spec, &mut nodes),
            }
        }
        nodes
    }

    fn spec(&mut self, spec: &SidebarItemSpec, out: &mut Vec<SidebarNode>) {
        match spec {
            SidebarItemSpec::Doc { id, label } => out.extend(self.doc_link(id, label.as_deref())),
            SidebarItemSpec::Link { href, label } => out.push(SidebarNode::Link {
                label: label.clone(),
                href: href.clone(),
                doc_id: None,
                unlisted: false,
            }),
            SidebarItemSpec::Category {
                label,
                items,
                collapsible,
                collapsed,
                link,
            } => {
                let link = link.as_ref().and_then(|CategoryLinkConfig::Doc { id }| {
                    let doc = self.lookup(id)?;
                    Some(CategoryLink {
                        doc_id: doc.id.clone(),
                        href: doc.permalink.clone(),
                    })
                });
                out.push(SidebarNode::Category {
                    label: label.clone(),
                    collapsible: collapsible.unwrap_or(self.ctx.defaults.collapsible),
                    collapsed: collapsed.unwrap_or(self.ctx.defaults.collapsed),
                    link,
                    description: None,
                    items: self.items(items),
                });
            }
            SidebarItemSpec::Autogenerated { dir_name } => {
                out.extend(autogenerate(dir_name, self.ctx));
            }
        }
    }

    fn lookup(&mut self, id: &str) -> Option<&'a Document> {
        let docs: &'a BTreeMap<String, Document> = self.ctx.docs;
        let doc = docs.get(id);
        if doc.is_none() {
            self.errors.push(
                NavigationError::UnresolvedSidebarItem {
                    version: self.ctx.version.to_owned(),
                    sidebar: self.sidebar.to_owned(),
                    id: id.to_owned(),
                }
                .into(),
            );
        }
        doc
    }

    fn doc_link(&mut self, id: &str, label: Option<&str>) -> Option<SidebarNode> {
        let doc = self.lookup(id)?;
        Some(SidebarNode::Link {
            label: label.unwrap_or_else(|| doc.sidebar_label()).to_owned(),
            href: doc.permalink.clone(),
            doc_id: Some(doc.id.clone()),
            unlisted: !doc.is_listed(),
        })
    }
}

/// Directory tree of listed documents.
#[derive(Default)]
struct DirNode<'a> {
    docs: Vec<&'a Document>,
    subdirs: BTreeMap<&'a str, DirNode<'a>>,
}

/// Expand `dir_name` (relative to the content root, `.` for the root).
fn autogenerate(dir_name: &str, ctx: &SidebarContext<'_>) -> Vec<SidebarNode> {
    let root_dir = dir_name.trim_matches('/');
    let root_dir = if root_dir == "." { "" } else { root_dir };

    let mut tree = DirNode::default();
    for doc in ctx.docs.values().filter(|doc| doc.is_listed()) {
        let dir = if doc.source_dir_name == "." {
            ""
        } else {
            doc.source_dir_name.as_str()
        };
        let rest = if root_dir.is_empty() {
            dir
        } else if dir == root_dir {
            ""
        } else if let Some(rest) = dir
            .strip_prefix(root_dir)
            .and_then(|r| r.strip_prefix('/'))
        {
            rest
        } else {
            continue;
        };

        let mut node = &mut tree;
        for part in rest.split('/').filter(|p| !p.is_empty()) {
            node = node.subdirs.entry(part).or_default();
        }
        node.docs.push(doc);
    }

    generate_dir(root_dir, &tree, None, ctx)
}

/// Sort key of an autogenerated item.
struct SortKey<'a> {
    position: Option<f64>,
    name: &'a str,
}

fn compare_keys(a: &SortKey<'_>, b: &SortKey<'_>, ordering: SidebarOrdering) -> Ordering {
    match ordering {
        SidebarOrdering::Alphabetical => a.name.cmp(b.name),
        SidebarOrdering::PositionedFirst => match (a.position, b.position) {
            (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.name.cmp(b.name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.name.cmp(b.name),
        },
    }
}

fn generate_dir(
    path: &str,
    node: &DirNode<'_>,
    skip_doc: Option<&str>,
    ctx: &SidebarContext<'_>,
) -> Vec<SidebarNode> {
    let mut entries: Vec<(SortKey<'_>, SidebarNode)> = Vec::new();

    for doc in node.docs.iter().filter(|doc| Some(doc.id.as_str()) != skip_doc) {
        entries.push((
            SortKey {
                position: doc.sidebar_position,
                name: doc.file_name(),
            },
            SidebarNode::Link {
                label: doc.sidebar_label().to_owned(),
                href: doc.permalink.clone(),
                doc_id: Some(doc.id.clone()),
                unlisted: false,
            },
        ));
    }

    for (name, sub) in &node.subdirs {
        let sub_path = if path.is_empty() {
            (*name).to_owned()
        } else {
            format!("{path}/{name}")
        };
        let meta = ctx.categories.get(&sub_path);
        let index_doc = sub.docs.iter().find(|doc| doc.is_index());
        let items = generate_dir(&sub_path, sub, index_doc.map(|doc| doc.id.as_str()), ctx);
        if items.is_empty() && index_doc.is_none() {
            continue;
        }

        let position = meta
            .and_then(|m| m.position)
            .or_else(|| index_doc.and_then(|doc| doc.sidebar_position));
        let label = meta
            .and_then(|m| m.label.clone())
            .unwrap_or_else(|| titlecase_from_slug(name));

        entries.push((
            SortKey {
                position,
                name: *name,
            },
            SidebarNode::Category {
                label,
                collapsible: meta
                    .and_then(|m| m.collapsible)
                    .unwrap_or(ctx.defaults.collapsible),
                collapsed: meta
                    .and_then(|m| m.collapsed)
                    .unwrap_or(ctx.defaults.collapsed),
                link: index_doc.map(|doc| CategoryLink {
                    doc_id: doc.id.clone(),
                    href: doc.permalink.clone(),
                }),
                description: meta.and_then(|m| m.description.clone()),
                items,
            },
        ));
    }

    entries.sort_by(|(a, _), (b, _)| compare_keys(a, b, ctx.defaults.ordering));
    entries.into_iter().map(|(_, node)| node).collect()
}

/// Generate a label from a directory name.
///
/// Splits on `-`, `_` and spaces and capitalizes each word.
fn titlecase_from_slug(slug: &str) -> String {
    let mut result = String::with_capacity(slug.len());
    for word in slug.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Document ids of a sidebar in pre-order.
///
/// A category's own link comes before its children. External links are
/// skipped.
#[must_use]
pub fn flatten_doc_ids(items: &[SidebarNode]) -> Vec<&str> {
    let mut ids = Vec::new();
    push_doc_ids(items, &mut ids);
    ids
}

fn push_doc_ids<'a>(items: &'a [SidebarNode], ids: &mut Vec<&'a str>) {
    for item in items {
        match item {
            SidebarNode::Link {
                doc_id: Some(id), ..
            } => ids.push(id),
            SidebarNode::Link { doc_id: None, .. } => {}
            SidebarNode::Category { link, items, .. } => {
                if let Some(link) = link {
                    ids.push(&link.doc_id);
                }
                push_doc_ids(items, ids);
            }
        }
    }
}

/// Categories enclosing `doc_id`, outermost first.
///
/// `None` when the document is not in the sidebar.
#[must_use]
pub fn breadcrumbs(items: &[SidebarNode], doc_id: &str) -> Option<Vec<Breadcrumb>> {
    let mut trail = Vec::new();
    find_trail(items, doc_id, &mut trail).then_some(trail)
}

fn find_trail(items: &[SidebarNode], doc_id: &str, trail: &mut Vec<Breadcrumb>) -> bool {
    for item in items {
        match item {
            SidebarNode::Link {
                doc_id: Some(id), ..
            } if id == doc_id => return true,
            SidebarNode::Link { .. } => {}
            SidebarNode::Category {
                label, link, items, ..
            } => {
                if link.as_ref().is_some_and(|link| link.doc_id == doc_id) {
                    return true;
                }
                trail.push(Breadcrumb {
                    label: label.clone(),
                    href: link.as_ref().map(|link| link.href.clone()),
                });
                if find_trail(items, doc_id, trail) {
                    return true;
                }
                trail.pop();
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_parser::FrontMatter;

    fn doc(path: &str, position: Option<f64>) -> Document {
        let (dir, file) = path.rsplit_once('/').unwrap_or((".", path));
        let stem = file.rsplit_once('.').map_or(file, |(s, _)| s);
        let id = if dir == "." {
            stem.to_owned()
        } else {
            format!("{dir}/{stem}")
        };
        Document {
            id: id.clone(),
            title: stem.to_owned(),
            description: String::new(),
            slug: format!("/{}", id.to_lowercase()),
            permalink: format!("/docs/{}", id.to_lowercase()),
            source: format!("@site/docs/{path}"),
            source_path: path.to_owned(),
            source_dir_name: dir.to_owned(),
            version: "current".to_owned(),
            edit_url: None,
            sidebar: None,
            sidebar_position: position,
            previous: None,
            next: None,
            tags: Vec::new(),
            draft: false,
            unlisted: false,
            front_matter: FrontMatter::default(),
        }
    }

    fn docs(list: Vec<Document>) -> BTreeMap<String, Document> {
        list.into_iter().map(|d| (d.id.clone(), d)).collect()
    }

    fn build(
        config: &SidebarsConfig,
        docs: &BTreeMap<String, Document>,
        categories: &BTreeMap<String, CategoryMetadata>,
        defaults: SidebarConfig,
    ) -> Result<BTreeMap<String, Vec<SidebarNode>>, Vec<SiteError>> {
        build_sidebars(
            config,
            &SidebarContext {
                version: "current",
                docs,
                categories,
                defaults,
            },
        )
    }

    fn labels(items: &[SidebarNode]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                SidebarNode::Link { label, .. } | SidebarNode::Category { label, .. } => {
                    label.clone()
                }
            })
            .collect()
    }

    #[test]
    fn test_autogenerate_positioned_first() {
        let docs = docs(vec![
            doc("intro.md", None),
            doc("dp/intro.md", None),
            doc("dp/patterns.md", Some(1.0)),
        ]);
        let sidebars = build(
            &SidebarsConfig::autogenerated("docsSidebar"),
            &docs,
            &BTreeMap::new(),
            SidebarConfig::default(),
        )
        .unwrap();

        let items = &sidebars["docsSidebar"];
        assert_eq!(labels(items), vec!["Dp", "intro"]);
        let SidebarNode::Category { items: dp, .. } = &items[0] else {
            panic!("expected category");
        };
        assert_eq!(labels(dp), vec!["patterns", "intro"]);
        assert_eq!(
            flatten_doc_ids(items),
            vec!["dp/patterns", "dp/intro", "intro"]
        );
    }

    #[test]
    fn test_autogenerate_alphabetical_policy() {
        let docs = docs(vec![doc("b.md", Some(1.0)), doc("a.md", Some(2.0))]);
        let defaults = SidebarConfig {
            ordering: SidebarOrdering::Alphabetical,
            ..SidebarConfig::default()
        };
        let sidebars = build(
            &SidebarsConfig::autogenerated("s"),
            &docs,
            &BTreeMap::new(),
            defaults,
        )
        .unwrap();
        assert_eq!(labels(&sidebars["s"]), vec!["a", "b"]);
    }

    #[test]
    fn test_equal_positions_tie_break_by_name() {
        let docs = docs(vec![
            doc("zeta.md", Some(1.0)),
            doc("alpha.md", Some(1.0)),
            doc("mid.md", Some(0.5)),
        ]);
        let sidebars = build(
            &SidebarsConfig::autogenerated("s"),
            &docs,
            &BTreeMap::new(),
            SidebarConfig::default(),
        )
        .unwrap();
        assert_eq!(labels(&sidebars["s"]), vec!["mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_category_metadata_and_index_link() {
        let docs = docs(vec![
            doc("Dynamic Programming/index.md", None),
            doc("Dynamic Programming/Questions/lcs.md", None),
            doc("graphs/bfs.md", None),
        ]);
        let categories = BTreeMap::from([(
            "graphs".to_owned(),
            CategoryMetadata {
                label: Some("Graph Algorithms".to_owned()),
                position: Some(1.0),
                collapsed: Some(false),
                ..CategoryMetadata::default()
            },
        )]);
        let sidebars = build(
            &SidebarsConfig::autogenerated("s"),
            &docs,
            &categories,
            SidebarConfig::default(),
        )
        .unwrap();

        let items = &sidebars["s"];
        assert_eq!(labels(items), vec!["Graph Algorithms", "Dynamic Programming"]);
        assert!(matches!(
            &items[0],
            SidebarNode::Category { collapsed: false, collapsible: true, .. }
        ));
        let SidebarNode::Category { link, items: dp, .. } = &items[1] else {
            panic!("expected category");
        };
        assert_eq!(
            link.as_ref().map(|l| l.doc_id.as_str()),
            Some("Dynamic Programming/index")
        );
        assert_eq!(labels(dp), vec!["Questions"]);
        assert_eq!(
            breadcrumbs(items, "Dynamic Programming/Questions/lcs"),
            Some(vec![
                Breadcrumb {
                    label: "Dynamic Programming".to_owned(),
                    href: Some("/docs/dynamic programming/index".to_owned()),
                },
                Breadcrumb {
                    label: "Questions".to_owned(),
                    href: None,
                },
            ])
        );
    }

    #[test]
    fn test_autogenerate_skips_unlisted_and_drafts() {
        let mut hidden = doc("hidden.md", None);
        hidden.unlisted = true;
        let mut draft = doc("draft.md", None);
        draft.draft = true;
        let docs = docs(vec![doc("intro.md", None), hidden, draft]);
        let sidebars = build(
            &SidebarsConfig::autogenerated("s"),
            &docs,
            &BTreeMap::new(),
            SidebarConfig::default(),
        )
        .unwrap();
        assert_eq!(labels(&sidebars["s"]), vec!["intro"]);
    }

    #[test]
    fn test_explicit_sidebar_items() {
        let mut hidden = doc("hidden.md", None);
        hidden.unlisted = true;
        let docs = docs(vec![doc("intro.md", None), hidden, doc("dp/lcs.md", None)]);
        let config = SidebarsConfig::from_yaml(
            r"
main:
  - intro
  - type: doc
    id: hidden
    label: Secret
  - type: category
    label: DP
    collapsed: false
    items:
      - type: autogenerated
        dirName: dp
  - type: link
    label: GitHub
    href: https://github.com/acme
",
        )
        .unwrap();
        let sidebars = build(&config, &docs, &BTreeMap::new(), SidebarConfig::default()).unwrap();

        let items = &sidebars["main"];
        assert_eq!(labels(items), vec!["intro", "Secret", "DP", "GitHub"]);
        assert!(matches!(&items[1], SidebarNode::Link { unlisted: true, .. }));
        assert!(matches!(&items[3], SidebarNode::Link { doc_id: None, .. }));
        assert_eq!(flatten_doc_ids(items), vec!["intro", "hidden", "dp/lcs"]);
    }

    #[test]
    fn test_unresolved_items_all_reported() {
        let docs = docs(vec![doc("intro.md", None)]);
        let config = SidebarsConfig::from_yaml(
            "main:\n  - intro\n  - missing\n  - type: category\n    label: C\n    link: {type: doc, id: gone}\n    items: []\n",
        )
        .unwrap();
        let errors = build(&config, &docs, &BTreeMap::new(), SidebarConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            SiteError::Navigation(NavigationError::UnresolvedSidebarItem { id, .. }) if id == "missing"
        ));
    }

    #[test]
    fn test_malformed_sidebar_config() {
        let err = SidebarsConfig::from_yaml("main:\n  - type: nonsense\n").unwrap_err();
        assert!(matches!(err, NavigationError::MalformedConfig(_)));
    }

    #[test]
    fn test_category_metadata_parse() {
        let meta = CategoryMetadata::from_yaml("dp", "label: DP\nposition: 2\n").unwrap();
        assert_eq!(meta.label.as_deref(), Some("DP"));
        assert_eq!(meta.position, Some(2.0));
        assert!(CategoryMetadata::from_yaml("dp", "label: [").is_err());
    }

    #[test]
    fn test_titlecase_from_slug() {
        assert_eq!(titlecase_from_slug("setup-guide"), "Setup Guide");
        assert_eq!(titlecase_from_slug("my_page"), "My Page");
        assert_eq!(titlecase_from_slug("Dynamic Programming"), "Dynamic Programming");
    }

    #[test]
    fn test_serialized_link_shape() {
        let node = SidebarNode::Link {
            label: "LCS".to_owned(),
            href: "/docs/lcs".to_owned(),
            doc_id: Some("lcs".to_owned()),
            unlisted: false,
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::json!({"type": "link", "label": "LCS", "href": "/docs/lcs", "docId": "lcs", "unlisted": false})
        );
    }
}
