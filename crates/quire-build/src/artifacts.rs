//! Artifact emission.
//!
//! Everything is written into a staging directory next to the output
//! directory and swapped in at the end, so a failed build never leaves a
//! partial site behind and never touches the previous output.
//!
//! Layout:
//!
//! ```text
//! manifest.json
//! routes.json
//! search-index.json
//! data/<version>/<id-slug>-<hash>.json
//! <route>/index.html
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};

use quire_config::Config;
use quire_parser::FrontMatter;
use quire_renderer::{RenderNode, TocEntry, slugify};
use quire_site::{Breadcrumb, Document, NavLink, RouteEntry, RouteKind, Version};

use crate::error::BuildError;
use crate::pipeline::{CompiledPage, SiteBuild};
use crate::template::{ListingData, ListingItem, PageData, render_listing, render_page};

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub version_count: usize,
    pub document_count: usize,
    pub route_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    site: SiteSummary<'a>,
    versions: Vec<ManifestVersion<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteSummary<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    base_url: &'a str,
}

#[derive(Serialize)]
struct ManifestVersion<'a> {
    #[serde(flatten)]
    version: &'a Version,
    docs: BTreeMap<&'a str, DocSummary<'a>>,
}

#[derive(Serialize)]
struct DocSummary<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    sidebar: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteRecord<'a> {
    kind: RouteKind,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    default: bool,
    /// Static page, relative to the output directory.
    file: String,
    /// Page payload of document routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

#[derive(Serialize)]
struct SearchEntry<'a> {
    version: &'a str,
    id: &'a str,
    title: &'a str,
    permalink: &'a str,
    headings: Vec<&'a str>,
    text: &'a str,
}

/// Hydration payload of a document page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocPayload<'a> {
    metadata: &'a Document,
    breadcrumbs: &'a [Breadcrumb],
    nodes: &'a [RenderNode],
    toc: &'a [TocEntry],
    front_matter: &'a FrontMatter,
    previous: Option<&'a NavLink>,
    next: Option<&'a NavLink>,
}

/// Hydration payload of a non-document page.
#[derive(Serialize)]
struct ListingPayload<'a> {
    kind: RouteKind,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

/// Write all artifacts of `site` and swap them into the output directory.
pub fn write_site(site: &SiteBuild, config: &Config) -> Result<BuildReport, BuildError> {
    let output_dir = &config.docs_resolved.output_dir;
    let parent = match output_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| BuildError::io(&parent, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".quire-staging-")
        .tempdir_in(&parent)
        .map_err(|e| BuildError::io(&parent, e))?;
    let writer = Staging {
        root: staging.path(),
    };

    let document_count = write_documents(&writer, site, config)?;
    write_listings(&writer, site, config)?;
    writer.write_json("manifest.json", &manifest(site, config))?;
    writer.write_json("routes.json", &route_records(site)?)?;
    writer.write_json("search-index.json", &search_entries(site))?;

    swap_into_place(staging, output_dir, &parent)?;

    let report = BuildReport {
        output_dir: output_dir.clone(),
        version_count: site.registry.versions().len(),
        document_count,
        route_count: site.routes.len(),
    };
    tracing::info!(
        path = %output_dir.display(),
        document_count = report.document_count,
        route_count = report.route_count,
        "Wrote site"
    );
    Ok(report)
}

struct Staging<'a> {
    root: &'a Path,
}

impl Staging<'_> {
    fn write(&self, relative: &str, contents: &[u8]) -> Result<(), BuildError> {
        let path = self.root.join(relative);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
        }
        fs::write(&path, contents).map_err(|e| BuildError::io(&path, e))
    }

    fn write_json<T: Serialize>(&self, relative: &str, value: &T) -> Result<(), BuildError> {
        let mut json = to_json(relative, value, true)?;
        json.push('\n');
        self.write(relative, json.as_bytes())
    }
}

fn to_json<T: Serialize>(name: &str, value: &T, pretty: bool) -> Result<String, BuildError> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|source| BuildError::Serialize {
        name: name.to_owned(),
        source,
    })
}

/// Write payload and page of every document. Returns the document count.
fn write_documents(
    writer: &Staging<'_>,
    site: &SiteBuild,
    config: &Config,
) -> Result<usize, BuildError> {
    let docs: Vec<(&Version, &Document, &CompiledPage)> = site
        .registry
        .versions()
        .iter()
        .flat_map(|version| {
            version.docs().filter_map(move |doc| {
                site.page(&version.name, &doc.id)
                    .map(|page| (version, doc, page))
            })
        })
        .collect();

    docs.par_iter().try_for_each(|&(version, doc, page)| {
        let metadata = site
            .routes
            .get(&doc.permalink)
            .and_then(|route| route.metadata.as_ref());
        let breadcrumbs = metadata.map_or(&[][..], |m| m.breadcrumbs.as_slice());

        let payload = DocPayload {
            metadata: doc,
            breadcrumbs,
            nodes: &page.nodes,
            toc: &page.toc,
            front_matter: &doc.front_matter,
            previous: doc.previous.as_ref(),
            next: doc.next.as_ref(),
        };
        let data_path = data_file(&version.name, &doc.id);
        writer.write_json(&data_path, &payload)?;

        let sidebar = doc
            .sidebar
            .as_ref()
            .and_then(|name| version.docs_sidebars.get(name))
            .map_or(&[][..], Vec::as_slice);
        let toc = if doc.front_matter.hide_table_of_contents {
            &[][..]
        } else {
            page.toc.as_slice()
        };
        let html = render_page(&PageData {
            site_title: &config.site.title,
            title: &doc.title,
            description: &doc.description,
            permalink: &doc.permalink,
            version_label: &version.label,
            banner: version.banner,
            sidebar,
            breadcrumbs,
            content_html: &page.html,
            toc,
            previous: doc.previous.as_ref(),
            next: doc.next.as_ref(),
            edit_url: doc.edit_url.as_deref(),
            payload: &to_json(&data_path, &payload, false)?,
        });
        writer.write(&route_file(&doc.permalink)?, html.as_bytes())
    })?;

    Ok(docs.len())
}

/// Write pages of tag and static routes.
fn write_listings(writer: &Staging<'_>, site: &SiteBuild, config: &Config) -> Result<(), BuildError> {
    for (path, route) in site.routes.iter() {
        let items = match route.kind {
            RouteKind::Doc => continue,
            RouteKind::TagIndex => tag_index_items(site, route),
            RouteKind::Tag => tagged_doc_items(site, route, path),
            RouteKind::Static => Vec::new(),
        };
        let title = match route.kind {
            RouteKind::TagIndex => "Tags".to_owned(),
            RouteKind::Tag => format!("Tag: {}", route.target),
            _ => route.target.clone(),
        };
        let payload = ListingPayload {
            kind: route.kind,
            target: &route.target,
            version: route.version.as_deref(),
        };
        let html = render_listing(&ListingData {
            site_title: &config.site.title,
            title: &title,
            items,
            payload: &to_json(path, &payload, false)?,
        });
        writer.write(&route_file(path)?, html.as_bytes())?;
    }
    Ok(())
}

fn listed_docs<'a>(site: &'a SiteBuild, route: &RouteEntry) -> impl Iterator<Item = &'a Document> {
    route
        .version
        .as_deref()
        .and_then(|name| site.registry.get(name))
        .into_iter()
        .flat_map(Version::docs)
        .filter(|doc| doc.is_listed())
}

fn tag_index_items<'a>(site: &'a SiteBuild, route: &RouteEntry) -> Vec<ListingItem<'a>> {
    let mut counts: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    for doc in listed_docs(site, route) {
        for tag in &doc.tags {
            counts
                .entry(tag.permalink.as_str())
                .or_insert((tag.label.as_str(), 0))
                .1 += 1;
        }
    }
    counts
        .into_iter()
        .map(|(href, (label, count))| ListingItem {
            label,
            href,
            detail: Some(format!("({count})")),
        })
        .collect()
}

fn tagged_doc_items<'a>(site: &'a SiteBuild, route: &RouteEntry, path: &str) -> Vec<ListingItem<'a>> {
    listed_docs(site, route)
        .filter(|doc| doc.tags.iter().any(|tag| tag.permalink == path))
        .map(|doc| ListingItem {
            label: &doc.title,
            href: &doc.permalink,
            detail: (!doc.description.is_empty()).then(|| doc.description.clone()),
        })
        .collect()
}

fn manifest<'a>(site: &'a SiteBuild, config: &'a Config) -> Manifest<'a> {
    Manifest {
        site: SiteSummary {
            title: &config.site.title,
            url: config.site.url.as_deref(),
            base_url: &config.site.base_url,
        },
        versions: site
            .registry
            .versions()
            .iter()
            .map(|version| ManifestVersion {
                version,
                docs: version
                    .docs()
                    .map(|doc| {
                        (
                            doc.id.as_str(),
                            DocSummary {
                                id: &doc.id,
                                title: &doc.title,
                                description: &doc.description,
                                sidebar: doc.sidebar.as_deref(),
                            },
                        )
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn route_records(site: &SiteBuild) -> Result<BTreeMap<&str, RouteRecord<'_>>, BuildError> {
    site.routes
        .iter()
        .map(|(path, route)| {
            let data = match (route.kind, route.version.as_deref()) {
                (RouteKind::Doc, Some(version)) => Some(data_file(version, &route.target)),
                _ => None,
            };
            let record = RouteRecord {
                kind: route.kind,
                target: &route.target,
                version: route.version.as_deref(),
                default: route.default,
                file: route_file(path)?,
                data,
            };
            Ok((path, record))
        })
        .collect()
}

fn search_entries(site: &SiteBuild) -> Vec<SearchEntry<'_>> {
    site.registry
        .versions()
        .iter()
        .flat_map(|version| {
            version
                .docs()
                .filter(|doc| doc.is_listed())
                .filter_map(move |doc| {
                    let page = site.page(&version.name, &doc.id)?;
                    Some(SearchEntry {
                        version: &version.name,
                        id: &doc.id,
                        title: &doc.title,
                        permalink: &doc.permalink,
                        headings: page.toc.iter().map(|entry| entry.value.as_str()).collect(),
                        text: &page.text,
                    })
                })
        })
        .collect()
}

/// Payload path of a document, unique per id even when slugs collide.
fn data_file(version: &str, id: &str) -> String {
    let slug = id
        .split('/')
        .map(slugify)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    let hash = hex::encode(&hasher.finalize()[..4]);
    if slug.is_empty() {
        format!("data/{version}/{hash}.json")
    } else {
        format!("data/{version}/{slug}-{hash}.json")
    }
}

/// Page file of a route path.
fn route_file(path: &str) -> Result<String, BuildError> {
    let mut file = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(BuildError::UnsafeRoute(path.to_owned()));
        }
        file.push_str(segment);
        file.push('/');
    }
    file.push_str("index.html");
    Ok(file)
}

/// Replace `output_dir` with the staged tree.
///
/// The previous output is moved aside first and restored if the final
/// rename fails.
fn swap_into_place(
    staging: tempfile::TempDir,
    output_dir: &Path,
    parent: &Path,
) -> Result<(), BuildError> {
    let previous = if output_dir.exists() {
        let holder = tempfile::Builder::new()
            .prefix(".quire-previous-")
            .tempdir_in(parent)
            .map_err(|e| BuildError::io(parent, e))?;
        let moved = holder.path().join("output");
        fs::rename(output_dir, &moved).map_err(|e| BuildError::io(output_dir, e))?;
        Some((holder, moved))
    } else {
        None
    };

    if let Err(e) = fs::rename(staging.path(), output_dir) {
        if let Some((_, moved)) = &previous {
            if let Err(restore) = fs::rename(moved, output_dir) {
                tracing::error!(path = %output_dir.display(), error = %restore, "Failed to restore previous output");
            }
        }
        return Err(BuildError::io(output_dir, e));
    }

    // Dropping the holder removes the previous output.
    drop(previous);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_file() {
        assert_eq!(route_file("/").unwrap(), "index.html");
        assert_eq!(route_file("/docs/intro").unwrap(), "docs/intro/index.html");
        assert_eq!(
            route_file("/docs/dynamic programming/lcs").unwrap(),
            "docs/dynamic programming/lcs/index.html"
        );
        assert!(matches!(
            route_file("/docs/../../etc"),
            Err(BuildError::UnsafeRoute(_))
        ));
    }

    #[test]
    fn test_data_file_distinguishes_case() {
        let upper = data_file("current", "Guide");
        let lower = data_file("current", "guide");
        assert!(upper.starts_with("data/current/guide-"));
        assert!(lower.starts_with("data/current/guide-"));
        assert_ne!(upper, lower);
        assert_eq!(data_file("current", "dp/intro"), data_file("current", "dp/intro"));
        assert!(data_file("current", "dp/intro").starts_with("data/current/dp-intro-"));
    }

    #[test]
    fn test_swap_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("build");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("stale.html"), "old").unwrap();

        let staging = tempfile::Builder::new()
            .prefix(".quire-staging-")
            .tempdir_in(dir.path())
            .unwrap();
        fs::write(staging.path().join("index.html"), "new").unwrap();

        swap_into_place(staging, &output, dir.path()).unwrap();

        assert_eq!(fs::read_to_string(output.join("index.html")).unwrap(), "new");
        assert!(!output.join("stale.html").exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("build")]);
    }
}
