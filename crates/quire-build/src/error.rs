//! Build error types.

use std::io;
use std::path::PathBuf;

use quire_site::Diagnostics;

/// Error returned by a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// I/O failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Artifact serialization failed.
    #[error("failed to serialize {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A route path would escape the output directory.
    #[error("route {0} cannot be written inside the output directory")]
    UnsafeRoute(String),

    /// The corpus has parse or structural errors; nothing was written.
    #[error("build failed with {} error(s)", .0.len())]
    Failed(Diagnostics),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Diagnostics of a failed build, if any.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Failed(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}
