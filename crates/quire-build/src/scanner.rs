//! Content discovery by filesystem walking.
//!
//! The scanner only locates files; reading and parsing happen in the
//! parallel stage of the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// Category metadata file name.
pub(crate) const CATEGORY_FILENAME: &str = "_category_.yaml";

/// A content file found under a content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentFile {
    /// Path relative to the content root, `/`-separated.
    pub relative_path: String,
    pub path: PathBuf,
}

/// Everything found under one content root.
#[derive(Debug, Default)]
pub(crate) struct ContentScan {
    /// Documents sorted by relative path.
    pub documents: Vec<ContentFile>,
    /// Category metadata files keyed by relative directory, empty for the root.
    pub categories: Vec<ContentFile>,
}

/// Walk `root` and collect documents and category metadata.
///
/// Hidden entries and entries starting with `_` are skipped, except the
/// category metadata file. A missing root yields an empty scan.
pub(crate) fn scan_content(root: &Path) -> Result<ContentScan, BuildError> {
    let mut scan = ContentScan::default();
    if !root.is_dir() {
        tracing::warn!(path = %root.display(), "Content directory does not exist");
        return Ok(scan);
    }
    scan_directory(root, "", &mut scan)?;
    scan.documents
        .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    scan.categories
        .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(
        path = %root.display(),
        document_count = scan.documents.len(),
        category_count = scan.categories.len(),
        "Scanned content"
    );
    Ok(scan)
}

fn scan_directory(dir: &Path, prefix: &str, scan: &mut ContentScan) -> Result<(), BuildError> {
    let entries = fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

        if is_dir {
            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }
            let child = join_relative(prefix, &name);
            scan_directory(&path, &child, scan)?;
        } else if name == CATEGORY_FILENAME {
            scan.categories.push(ContentFile {
                relative_path: prefix.to_owned(),
                path,
            });
        } else if is_document(&name) {
            scan.documents.push(ContentFile {
                relative_path: join_relative(prefix, &name),
                path,
            });
        }
    }
    Ok(())
}

fn is_document(name: &str) -> bool {
    if name.starts_with('.') || name.starts_with('_') {
        return false;
    }
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("mdx"))
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}
