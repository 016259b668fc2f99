//! Serving a built site.
//!
//! Route paths resolve through the route table; anything else maps onto a
//! file below the output directory. Paths are percent-decoded and never
//! leave the output directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::Response;
use percent_encoding::percent_decode_str;

use crate::error::ServerError;
use crate::state::AppState;

/// Serve a route page or a file of the built site.
pub(crate) async fn serve_site(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ServerError> {
    let not_found = || ServerError::PageNotFound(uri.path().to_owned());

    let decoded = percent_decode_str(uri.path())
        .decode_utf8()
        .map_err(|_| not_found())?;
    let route = normalize_route(&decoded);

    if let Some(entry) = state.routes.get(route) {
        return serve_file(&state.root.join(&entry.file)).await.map_err(|e| match e {
            ServerError::PageNotFound(_) => not_found(),
            other => other,
        });
    }

    let relative = safe_relative_path(&decoded).ok_or_else(not_found)?;
    let mut candidate = state.root.join(relative);
    if tokio::fs::metadata(&candidate)
        .await
        .is_ok_and(|m| m.is_dir())
    {
        candidate.push("index.html");
    }
    serve_file(&candidate).await.map_err(|e| match e {
        ServerError::PageNotFound(_) => not_found(),
        other => other,
    })
}

async fn serve_file(path: &Path) -> Result<Response, ServerError> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
            return Err(ServerError::PageNotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(path = %path.display(), "Serving file");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_for(path))
        .body(Body::from(content))
        .map_err(|e| ServerError::Io(io::Error::other(e)))
}

/// Route table key of a request path: no trailing slash except for the root.
fn normalize_route(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Relative file path for a request path, `None` if it would escape the root.
fn safe_relative_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') || segment.contains('\0') {
            return None;
        }
        relative.push(segment);
    }
    Some(relative)
}

/// Content type by file extension.
fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("/"), "/");
        assert_eq!(normalize_route("/docs/intro/"), "/docs/intro");
        assert_eq!(normalize_route("/docs/intro"), "/docs/intro");
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(
            safe_relative_path("/data/current/intro.json"),
            Some(PathBuf::from("data/current/intro.json"))
        );
        assert_eq!(safe_relative_path("/"), Some(PathBuf::new()));
        assert_eq!(safe_relative_path("/../etc/passwd"), None);
        assert_eq!(safe_relative_path("/docs/./intro"), None);
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("a/index.html")), "text/html; charset=utf-8");
        assert_eq!(mime_for(Path::new("routes.json")), "application/json");
        assert_eq!(mime_for(Path::new("blob")), "application/octet-stream");
    }
}
