//! Documents before and after resolution.

use serde::Serialize;

use quire_parser::FrontMatter;

/// A parsed document handed to the resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSource {
    /// Path relative to the version's content root, `/`-separated.
    pub relative_path: String,
    pub front_matter: FrontMatter,
    /// Title derived by the parser.
    pub title: Option<String>,
    /// Description derived by the parser.
    pub description: Option<String>,
}

impl DocumentSource {
    /// Directory part of the relative path; `.` for the content root.
    #[must_use]
    pub fn dir_name(&self) -> &str {
        match self.relative_path.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => ".",
        }
    }

    /// File name including extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map_or(self.relative_path.as_str(), |(_, name)| name)
    }

    /// File name without extension.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    /// Whether this is the index document of its directory.
    #[must_use]
    pub fn is_index(&self) -> bool {
        let stem = self.file_stem();
        stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme")
    }
}

/// Weak reference to a neighbouring document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

/// A tag with its listing route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub label: String,
    pub permalink: String,
}

/// A fully resolved document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Stable id within the version (`dir/sub/name`).
    pub id: String,
    pub title: String,
    pub description: String,
    /// Route path relative to the version base, always starting with `/`.
    pub slug: String,
    /// Absolute route path.
    pub permalink: String,
    /// Project-relative source reference (`@site/docs/intro.md`).
    pub source: String,
    /// Path relative to the content root.
    pub source_path: String,
    /// Directory relative to the content root; `.` for the root.
    pub source_dir_name: String,
    /// Owning version name.
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Sidebar this document is navigated from.
    pub sidebar: Option<String>,
    pub sidebar_position: Option<f64>,
    #[serde(skip)]
    pub previous: Option<NavLink>,
    #[serde(skip)]
    pub next: Option<NavLink>,
    pub tags: Vec<TagLink>,
    pub draft: bool,
    pub unlisted: bool,
    /// Serialized next to the document by the page payload.
    #[serde(skip)]
    pub front_matter: FrontMatter,
}

impl Document {
    /// Listed documents appear in autogenerated sidebars and search.
    #[must_use]
    pub fn is_listed(&self) -> bool {
        !self.draft && !self.unlisted
    }

    /// Label for sidebar links.
    #[must_use]
    pub fn sidebar_label(&self) -> &str {
        self.front_matter
            .sidebar_label
            .as_deref()
            .unwrap_or(&self.title)
    }

    /// File name of the source document.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.source_path
            .rsplit_once('/')
            .map_or(self.source_path.as_str(), |(_, name)| name)
    }

    /// Whether this is the index document of its directory.
    #[must_use]
    pub fn is_index(&self) -> bool {
        let name = self.file_name();
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme")
    }

    /// Weak reference used by neighbouring documents.
    #[must_use]
    pub fn nav_link(&self) -> NavLink {
        NavLink {
            title: self.sidebar_label().to_owned(),
            permalink: self.permalink.clone(),
        }
    }
}

/// Join URL path segments with single slashes.
///
/// The result starts with `/` and has no trailing slash unless it is the
/// root itself.
#[must_use]
pub fn join_url(segments: &[&str]) -> String {
    let mut path = String::new();
    for part in segments.iter().flat_map(|s| s.split('/')) {
        if part.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(part);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &str) -> DocumentSource {
        DocumentSource {
            relative_path: path.to_owned(),
            front_matter: FrontMatter::default(),
            title: None,
            description: None,
        }
    }

    #[test]
    fn test_source_path_parts() {
        let doc = source("Dynamic Programming/Questions/lcs.md");
        assert_eq!(doc.dir_name(), "Dynamic Programming/Questions");
        assert_eq!(doc.file_name(), "lcs.md");
        assert_eq!(doc.file_stem(), "lcs");
        assert!(!doc.is_index());

        let root = source("intro.mdx");
        assert_eq!(root.dir_name(), ".");
        assert_eq!(root.file_stem(), "intro");
    }

    #[test]
    fn test_index_detection() {
        assert!(source("dp/index.md").is_index());
        assert!(source("dp/README.md").is_index());
        assert!(!source("dp/indexes.md").is_index());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(&["/", "docs", "/intro"]), "/docs/intro");
        assert_eq!(join_url(&["/", "docs", ""]), "/docs");
        assert_eq!(join_url(&["/", "", "/"]), "/");
        assert_eq!(join_url(&["/base/", "docs/", "next", "/dp/"]), "/base/docs/next/dp");
    }
}
