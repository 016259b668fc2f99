//! Router construction.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// Every request goes to the site handler; there are no API routes.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .fallback(static_files::serve_site)
        .layer(TraceLayer::new_for_http());
    security::with_security_headers(router).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn site() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/dynamic programming")).unwrap();
        fs::create_dir_all(root.join("data/current")).unwrap();
        fs::write(
            root.join("routes.json"),
            r#"{
  "/": {"kind": "static", "target": "home", "default": false, "file": "index.html"},
  "/docs/dynamic programming": {"kind": "doc", "target": "dynamic programming/index", "version": "current", "default": true, "file": "docs/dynamic programming/index.html"}
}"#,
        )
        .unwrap();
        fs::write(root.join("index.html"), "<h1>Home</h1>").unwrap();
        fs::write(root.join("docs/dynamic programming/index.html"), "<h1>DP</h1>").unwrap();
        fs::write(root.join("data/current/dp.json"), "{}").unwrap();

        let state = AppState::load(root).unwrap();
        (dir, create_router(Arc::new(state)))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_serves_routes_with_encoded_paths() {
        let (_dir, router) = site();
        let (status, content_type, body) = get(router, "/docs/dynamic%20programming/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
        assert_eq!(body, "<h1>DP</h1>");
    }

    #[tokio::test]
    async fn test_serves_root_and_files() {
        let (_dir, router) = site();
        let (status, _, body) = get(router.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Home</h1>");

        let (status, content_type, _) = get(router, "/data/current/dp.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_missing_and_escaping_paths_are_not_found() {
        let (_dir, router) = site();
        let (status, _, _) = get(router.clone(), "/docs/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = get(router, "/%2e%2e/secret").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let (_dir, router) = site();
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert!(headers.contains_key("content-security-policy"));
        assert_eq!(headers["referrer-policy"], "same-origin");
    }
}
