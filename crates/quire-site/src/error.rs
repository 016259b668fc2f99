//! Corpus-wide error taxonomy and build diagnostics.
//!
//! Per-document parse failures and structural failures share one
//! [`Diagnostic`] shape so a build can report everything it found at once.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Duplicate identity or dangling reference inside one version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("duplicate permalink {permalink} in version {version}: {first} and {second}")]
    DuplicatePermalink {
        version: String,
        permalink: String,
        first: String,
        second: String,
    },
    #[error("duplicate document id {id} in version {version}: {first} and {second}")]
    DuplicateId {
        version: String,
        id: String,
        first: String,
        second: String,
    },
    #[error("{source_path}: pagination target {target} does not exist in version {version}")]
    UnknownPaginationTarget {
        version: String,
        source_path: String,
        target: String,
    },
}

/// Sidebar configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("sidebar {sidebar} in version {version} references unknown document {id}")]
    UnresolvedSidebarItem {
        version: String,
        sidebar: String,
        id: String,
    },
    #[error("malformed sidebar configuration: {0}")]
    MalformedConfig(String),
    #[error("malformed category metadata for {dir}: {message}")]
    MalformedCategory { dir: String, message: String },
}

/// Two routes claim the same path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("route {path} is claimed by both {first} and {second}")]
pub struct RouteCollisionError {
    pub path: String,
    pub first: String,
    pub second: String,
}

/// Invariant violation on the version set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionRegistryError {
    #[error("versions {first} and {second} are both marked isLast")]
    MultipleLast { first: String, second: String },
    #[error("version {0} is registered twice")]
    DuplicateVersion(String),
    #[error("document {doc_id} in version {version} references missing sidebar {sidebar}")]
    UnknownSidebar {
        version: String,
        sidebar: String,
        doc_id: String,
    },
}

/// Any structural error found while resolving the corpus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    RouteCollision(#[from] RouteCollisionError),
    #[error(transparent)]
    VersionRegistry(#[from] VersionRegistryError),
}

impl SiteError {
    /// Diagnostic category.
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Resolution(_) => DiagnosticKind::Resolution,
            Self::Navigation(_) => DiagnosticKind::Navigation,
            Self::RouteCollision(_) => DiagnosticKind::RouteCollision,
            Self::VersionRegistry(_) => DiagnosticKind::VersionRegistry,
        }
    }

    /// Source document most associated with the error, when known.
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        match self {
            Self::Resolution(
                ResolutionError::DuplicatePermalink { second, .. }
                | ResolutionError::DuplicateId { second, .. },
            ) => Some(second),
            Self::Resolution(ResolutionError::UnknownPaginationTarget { source_path, .. }) => {
                Some(source_path)
            }
            _ => None,
        }
    }
}

/// Diagnostic category, one per error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    Parse,
    Resolution,
    Navigation,
    RouteCollision,
    VersionRegistry,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse",
            Self::Resolution => "resolution",
            Self::Navigation => "navigation",
            Self::RouteCollision => "route-collision",
            Self::VersionRegistry => "version-registry",
        })
    }
}

/// One user-visible problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl From<&SiteError> for Diagnostic {
    fn from(err: &SiteError) -> Self {
        let diagnostic = Self::new(err.kind(), err.to_string());
        match err.source_path() {
            Some(path) => diagnostic.with_path(path),
            None => diagnostic,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        f.write_str(&self.message)
    }
}

/// Ordered collection of diagnostics from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend_site_errors<'a>(&mut self, errors: impl IntoIterator<Item = &'a SiteError>) {
        self.0.extend(errors.into_iter().map(Diagnostic::from));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Sort by kind, then path, then message.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| {
            (a.kind, &a.path, &a.message).cmp(&(b.kind, &b.path, &b.message))
        });
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, diagnostic) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}
