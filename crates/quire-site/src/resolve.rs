//! Document identity and navigation links.
//!
//! [`resolve_documents`] gives every parsed document of a version its id,
//! slug and permalink and rejects duplicates. Once sidebars exist,
//! [`assign_navigation`] binds each document to the first sidebar listing
//! it and derives previous/next from that sidebar's pre-order flattening,
//! then applies `pagination_prev` / `pagination_next` overrides.

use std::collections::{BTreeMap, HashMap};

use quire_renderer::slugify;

use crate::document::{Document, DocumentSource, TagLink, join_url};
use crate::error::{ResolutionError, SiteError};
use crate::sidebar::{SidebarNode, flatten_doc_ids};

/// Version-level inputs for identity resolution.
#[derive(Clone, Copy, Debug)]
pub struct DocumentContext<'a> {
    /// Version name.
    pub version: &'a str,
    /// Absolute route prefix of the version (e.g. `/docs/next`).
    pub base_path: &'a str,
    /// Content root relative to the project (e.g. `docs`).
    pub source_prefix: &'a str,
    pub edit_url: Option<&'a str>,
    pub include_drafts: bool,
}

/// Assign identities to every document of one version.
///
/// Documents are processed in path order, so of two colliding documents
/// the one with the later path is reported.
pub fn resolve_documents(
    mut sources: Vec<DocumentSource>,
    ctx: &DocumentContext<'_>,
) -> Result<BTreeMap<String, Document>, Vec<SiteError>> {
    sources.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut docs = BTreeMap::new();
    let mut permalinks: HashMap<String, String> = HashMap::new();
    let mut errors = Vec::new();

    for source in sources {
        let doc = resolve_document(source, ctx);

        if let Some(first) = permalinks.get(&doc.permalink) {
            errors.push(
                ResolutionError::DuplicatePermalink {
                    version: ctx.version.to_owned(),
                    permalink: doc.permalink.clone(),
                    first: first.clone(),
                    second: doc.source_path.clone(),
                }
                .into(),
            );
            continue;
        }
        if let Some(first) = docs.get(&doc.id).map(|d: &Document| d.source_path.clone()) {
            errors.push(
                ResolutionError::DuplicateId {
                    version: ctx.version.to_owned(),
                    id: doc.id.clone(),
                    first,
                    second: doc.source_path.clone(),
                }
                .into(),
            );
            continue;
        }

        permalinks.insert(doc.permalink.clone(), doc.source_path.clone());
        docs.insert(doc.id.clone(), doc);
    }

    if errors.is_empty() {
        tracing::debug!(version = ctx.version, document_count = docs.len(), "Resolved documents");
        Ok(docs)
    } else {
        Err(errors)
    }
}

fn resolve_document(source: DocumentSource, ctx: &DocumentContext<'_>) -> Document {
    let dir = match source.dir_name() {
        "." => "",
        dir => dir,
    };

    let base_id = source
        .front_matter
        .id
        .clone()
        .unwrap_or_else(|| source.file_stem().to_owned());
    let id = if dir.is_empty() {
        base_id
    } else {
        format!("{dir}/{base_id}")
    };

    let slug = resolve_slug(&source, dir);
    let permalink = join_url(&[ctx.base_path, &slug]);

    let title = source.title.clone().unwrap_or_else(|| {
        id.rsplit_once('/')
            .map_or(id.as_str(), |(_, last)| last)
            .to_owned()
    });

    let tags = source
        .front_matter
        .tags
        .iter()
        .map(|label| TagLink {
            label: label.clone(),
            permalink: join_url(&[ctx.base_path, "tags", &slugify(label)]),
        })
        .collect();

    let source_ref = join_url(&[ctx.source_prefix, &source.relative_path]);
    let edit_url = ctx
        .edit_url
        .map(|base| format!("{}{source_ref}", base.trim_end_matches('/')));

    Document {
        id,
        title,
        description: source.description.clone().unwrap_or_default(),
        slug,
        permalink,
        source: format!("@site{source_ref}"),
        source_dir_name: source.dir_name().to_owned(),
        version: ctx.version.to_owned(),
        edit_url,
        sidebar: None,
        sidebar_position: source.front_matter.sidebar_position,
        previous: None,
        next: None,
        tags,
        draft: source.front_matter.draft && !ctx.include_drafts,
        unlisted: source.front_matter.unlisted,
        source_path: source.relative_path,
        front_matter: source.front_matter,
    }
}

/// Slug relative to the version base.
///
/// An explicit slug is absolute when it starts with `/`, else relative to
/// the document's directory. Derived slugs lowercase the path; index
/// documents take their directory's slug.
fn resolve_slug(source: &DocumentSource, dir: &str) -> String {
    let dir = dir.to_lowercase();
    match source.front_matter.slug.as_deref() {
        Some(slug) if slug.starts_with('/') => join_url(&[slug]),
        Some(slug) => join_url(&[&dir, slug]),
        None if source.is_index() => join_url(&[&dir]),
        None => join_url(&[&dir, &source.file_stem().to_lowercase()]),
    }
}

/// Bind documents to sidebars and fill in previous/next links.
pub fn assign_navigation(
    docs: &mut BTreeMap<String, Document>,
    sidebars: &BTreeMap<String, Vec<SidebarNode>>,
    version: &str,
) -> Result<(), Vec<SiteError>> {
    // doc id -> (sidebar, previous id, next id)
    let mut placement: HashMap<&str, (&str, Option<&str>, Option<&str>)> = HashMap::new();
    for (name, items) in sidebars {
        let ids = flatten_doc_ids(items);
        for (index, &id) in ids.iter().enumerate() {
            placement.entry(id).or_insert_with(|| {
                let previous = index.checked_sub(1).map(|i| ids[i]);
                let next = ids.get(index + 1).copied();
                (name.as_str(), previous, next)
            });
        }
    }

    let mut errors = Vec::new();
    let mut updates = Vec::with_capacity(docs.len());
    for doc in docs.values() {
        let (sidebar, previous, next) = placement
            .get(doc.id.as_str())
            .copied()
            .map_or((None, None, None), |(s, p, n)| (Some(s), p, n));

        let mut target = |field: Option<&Option<String>>, derived: Option<&str>| match field {
            None => derived.map(str::to_owned),
            Some(None) => None,
            Some(Some(id)) if docs.contains_key(id) => Some(id.clone()),
            Some(Some(id)) => {
                errors.push(
                    ResolutionError::UnknownPaginationTarget {
                        version: version.to_owned(),
                        source_path: doc.source_path.clone(),
                        target: id.clone(),
                    }
                    .into(),
                );
                None
            }
        };
        let previous = target(doc.front_matter.pagination_prev.as_ref(), previous);
        let next = target(doc.front_matter.pagination_next.as_ref(), next);

        let link = |id: Option<String>| id.and_then(|id| docs.get(&id)).map(Document::nav_link);
        updates.push((
            doc.id.clone(),
            sidebar.map(str::to_owned),
            link(previous),
            link(next),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    for (id, sidebar, previous, next) in updates {
        if let Some(doc) = docs.get_mut(&id) {
            doc.sidebar = sidebar;
            doc.previous = previous;
            doc.next = next;
        }
    }
    Ok(())
}
