//! Application state.
//!
//! The route table of a built site, loaded once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ServerError;

/// Route table file written by `quire build`.
pub(crate) const ROUTES_FILENAME: &str = "routes.json";

/// The fields of a `routes.json` entry the server needs.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RouteFile {
    /// Page file relative to the output directory.
    pub file: String,
}

/// Application state shared across all handlers.
#[derive(Debug)]
pub(crate) struct AppState {
    /// Built site directory.
    pub(crate) root: PathBuf,
    /// Route path to page file.
    pub(crate) routes: BTreeMap<String, RouteFile>,
}

impl AppState {
    /// Load the route table from a built site.
    pub(crate) fn load(root: &Path) -> Result<Self, ServerError> {
        let path = root.join(ROUTES_FILENAME);
        if !path.is_file() {
            return Err(ServerError::NotBuilt(root.to_path_buf()));
        }
        let content = std::fs::read_to_string(&path)?;
        let routes = serde_json::from_str(&content)
            .map_err(|source| ServerError::InvalidRoutes { path, source })?;
        Ok(Self {
            root: root.to_path_buf(),
            routes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_requires_built_site() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppState::load(dir.path()).unwrap_err();
        assert!(matches!(err, ServerError::NotBuilt(_)));
    }

    #[test]
    fn test_load_reads_route_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ROUTES_FILENAME),
            r#"{"/docs/intro": {"kind": "doc", "target": "intro", "default": true, "file": "docs/intro/index.html"}}"#,
        )
        .unwrap();

        let state = AppState::load(dir.path()).unwrap();
        assert_eq!(state.routes["/docs/intro"].file, "docs/intro/index.html");
    }

    #[test]
    fn test_load_rejects_malformed_routes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ROUTES_FILENAME), "[").unwrap();
        let err = AppState::load(dir.path()).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRoutes { .. }));
    }
}
