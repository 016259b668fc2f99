//! Route graph assembly.
//!
//! Every version contributes one route per document, one tag index and one
//! route per tag; configured static pages are added on top. Paths are
//! unique across the whole site: any collision fails the build.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use quire_config::StaticPageConfig;

use crate::document::{NavLink, join_url};
use crate::error::{RouteCollisionError, SiteError};
use crate::sidebar::{Breadcrumb, breadcrumbs};
use crate::version::{Banner, Version, VersionRegistry};

/// What a route renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteKind {
    Doc,
    TagIndex,
    Tag,
    Static,
}

/// Data a page needs besides its compiled content.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub title: String,
    pub version_label: String,
    pub sidebar: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
    pub banner: Option<Banner>,
}

/// One entry of the route graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub kind: RouteKind,
    /// Document id, tag label or component name, depending on `kind`.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Served from the default (last released) version.
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RouteMetadata>,
}

impl RouteEntry {
    fn claimant(&self) -> String {
        let version = self.version.as_deref().unwrap_or("-");
        match self.kind {
            RouteKind::Doc => format!("document {version}:{}", self.target),
            RouteKind::TagIndex => format!("tag index of version {version}"),
            RouteKind::Tag => format!("tag {version}:{}", self.target),
            RouteKind::Static => format!("static page {}", self.target),
        }
    }
}

/// Route graph keyed by absolute path.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RouteTable(BTreeMap<String, RouteEntry>);

impl RouteTable {
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.0.get(path)
    }

    /// Routes in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.0.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, path: String, entry: RouteEntry, errors: &mut Vec<SiteError>) {
        match self.0.entry(path) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(slot) => {
                errors.push(
                    RouteCollisionError {
                        path: slot.key().clone(),
                        first: slot.get().claimant(),
                        second: entry.claimant(),
                    }
                    .into(),
                );
            }
        }
    }
}

/// Assemble the route graph of a sealed registry.
///
/// `base_url` prefixes static page paths; document and tag paths already
/// carry it through their version.
pub fn assemble_routes(
    registry: &VersionRegistry,
    static_pages: &[StaticPageConfig],
    base_url: &str,
) -> Result<RouteTable, Vec<SiteError>> {
    let mut table = RouteTable::default();
    let mut errors = Vec::new();

    for version in registry.versions() {
        add_version_routes(&mut table, version, &mut errors);
    }

    for page in static_pages {
        table.insert(
            join_url(&[base_url, &page.path]),
            RouteEntry {
                kind: RouteKind::Static,
                target: page.component.clone(),
                version: None,
                default: false,
                metadata: None,
            },
            &mut errors,
        );
    }

    if errors.is_empty() {
        tracing::info!(route_count = table.len(), "Assembled routes");
        Ok(table)
    } else {
        Err(errors)
    }
}

fn add_version_routes(table: &mut RouteTable, version: &Version, errors: &mut Vec<SiteError>) {
    let entry = |kind, target: &str, metadata| RouteEntry {
        kind,
        target: target.to_owned(),
        version: Some(version.name.clone()),
        default: version.is_last,
        metadata,
    };

    let mut tags: BTreeMap<&str, &str> = BTreeMap::new();
    for doc in version.docs() {
        let trail = doc
            .sidebar
            .as_ref()
            .and_then(|name| version.docs_sidebars.get(name))
            .and_then(|items| breadcrumbs(items, &doc.id))
            .unwrap_or_default();

        let metadata = RouteMetadata {
            title: doc.title.clone(),
            version_label: version.label.clone(),
            sidebar: doc.sidebar.clone(),
            breadcrumbs: trail,
            previous: doc.previous.clone(),
            next: doc.next.clone(),
            banner: version.banner,
        };
        table.insert(
            doc.permalink.clone(),
            entry(RouteKind::Doc, &doc.id, Some(metadata)),
            errors,
        );

        if doc.is_listed() {
            for tag in &doc.tags {
                tags.entry(tag.permalink.as_str()).or_insert(tag.label.as_str());
            }
        }
    }

    if tags.is_empty() {
        return;
    }

    table.insert(
        join_url(&[&version.path, "tags"]),
        entry(RouteKind::TagIndex, "tags", None),
        errors,
    );
    for (path, label) in tags {
        table.insert(path.to_owned(), entry(RouteKind::Tag, label, None), errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, TagLink};
    use crate::version::VersionRegistryBuilder;
    use pretty_assertions::assert_eq;
    use quire_parser::FrontMatter;

    fn doc(version: &str, id: &str, permalink: &str, tags: &[&str]) -> Document {
        let base = permalink.rsplit_once('/').map_or("", |(base, _)| base);
        Document {
            id: id.to_owned(),
            title: id.to_uppercase(),
            description: String::new(),
            slug: format!("/{id}"),
            permalink: permalink.to_owned(),
            source: format!("@site/docs/{id}.md"),
            source_path: format!("{id}.md"),
            source_dir_name: ".".to_owned(),
            version: version.to_owned(),
            edit_url: None,
            sidebar: None,
            sidebar_position: None,
            previous: None,
            next: None,
            tags: tags
                .iter()
                .map(|t| TagLink {
                    label: (*t).to_owned(),
                    permalink: format!("{base}/tags/{t}"),
                })
                .collect(),
            draft: false,
            unlisted: false,
            front_matter: FrontMatter::default(),
        }
    }

    fn version(name: &str, path: &str, is_last: bool, docs: Vec<Document>) -> Version {
        Version {
            name: name.to_owned(),
            label: name.to_owned(),
            path: path.to_owned(),
            banner: None,
            badge: false,
            is_last,
            docs_sidebars: BTreeMap::new(),
            docs: docs.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    fn registry(versions: Vec<Version>) -> VersionRegistry {
        let mut builder = VersionRegistryBuilder::new();
        for v in versions {
            builder.register(v).unwrap();
        }
        builder.seal().unwrap()
    }

    #[test]
    fn test_routes_per_version() {
        let registry = registry(vec![
            version(
                "current",
                "/docs/next",
                false,
                vec![doc("current", "intro", "/docs/next/intro", &[])],
            ),
            version(
                "1.0",
                "/docs",
                true,
                vec![doc("1.0", "intro", "/docs/intro", &["basics"])],
            ),
        ]);
        let pages = vec![StaticPageConfig {
            path: "/".to_owned(),
            component: "home".to_owned(),
        }];

        let table = assemble_routes(&registry, &pages, "/").unwrap();
        let paths: Vec<&str> = table.iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                "/",
                "/docs/intro",
                "/docs/next/intro",
                "/docs/tags",
                "/docs/tags/basics",
            ]
        );

        let released = table.get("/docs/intro").unwrap();
        assert_eq!(released.kind, RouteKind::Doc);
        assert!(released.default);
        assert_eq!(released.version.as_deref(), Some("1.0"));
        assert!(!table.get("/docs/next/intro").unwrap().default);
        assert_eq!(table.get("/").unwrap().kind, RouteKind::Static);
        assert_eq!(table.get("/docs/tags/basics").unwrap().target, "basics");
    }

    #[test]
    fn test_static_page_collision() {
        let registry = registry(vec![version(
            "current",
            "/",
            true,
            vec![doc("current", "index", "/", &[])],
        )]);
        let pages = vec![StaticPageConfig {
            path: "/".to_owned(),
            component: "home".to_owned(),
        }];

        let errors = assemble_routes(&registry, &pages, "/").unwrap_err();
        assert_eq!(
            errors,
            vec![SiteError::RouteCollision(RouteCollisionError {
                path: "/".to_owned(),
                first: "document current:index".to_owned(),
                second: "static page home".to_owned(),
            })]
        );
    }

    #[test]
    fn test_collision_across_versions() {
        let registry = registry(vec![
            version(
                "current",
                "/docs/x",
                false,
                vec![
                    doc("current", "intro", "/docs/x/intro", &[]),
                    doc("current", "setup", "/docs/x/setup", &[]),
                ],
            ),
            version(
                "2.0",
                "/docs/x",
                true,
                vec![doc("2.0", "intro", "/docs/x/intro", &[])],
            ),
        ]);

        let errors = assemble_routes(&registry, &[], "/").unwrap_err();
        assert_eq!(
            errors,
            vec![SiteError::RouteCollision(RouteCollisionError {
                path: "/docs/x/intro".to_owned(),
                first: "document current:intro".to_owned(),
                second: "document 2.0:intro".to_owned(),
            })]
        );
    }

    #[test]
    fn test_unlisted_documents_add_no_tags() {
        let mut hidden = doc("current", "hidden", "/docs/hidden", &["secret"]);
        hidden.unlisted = true;
        let registry = registry(vec![version("current", "/docs", true, vec![hidden])]);

        let table = assemble_routes(&registry, &[], "/").unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("/docs/hidden").is_some());
    }

    #[test]
    fn test_route_serialization() {
        let registry = registry(vec![version(
            "current",
            "/docs",
            true,
            vec![doc("current", "intro", "/docs/intro", &[])],
        )]);
        let table = assemble_routes(&registry, &[], "/").unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "/docs/intro": {
                    "kind": "doc",
                    "target": "intro",
                    "version": "current",
                    "default": true,
                    "metadata": {
                        "title": "INTRO",
                        "versionLabel": "current",
                        "sidebar": null,
                        "previous": null,
                        "next": null,
                        "banner": null
                    }
                }
            })
        );
    }
}
