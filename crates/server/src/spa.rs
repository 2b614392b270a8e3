//! Single-page front-end shell for every route the API does not claim.

use std::path::Path;

use axum::response::Html;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

const INDEX_FILE: &str = "index.html";

const EMBEDDED_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>rfqdesk</title>
</head>
<body>
  <div id="root">
    <h1>rfqdesk</h1>
    <p>The front-end bundle is not installed. The JSON API is available under <code>/api</code>.</p>
  </div>
</body>
</html>
"#;

/// Files from `static_dir`, unknown paths answered with its `index.html`.
/// Without an index the embedded shell is served instead.
pub fn service(static_dir: &Path) -> Router {
    let index = static_dir.join(INDEX_FILE);
    if index.is_file() {
        return Router::new()
            .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)));
    }

    warn!(
        event_name = "system.static.missing",
        static_dir = %static_dir.display(),
        "static front-end not found; serving embedded shell"
    );
    Router::new().fallback(embedded_shell)
}

async fn embedded_shell() -> Html<&'static str> {
    Html(EMBEDDED_SHELL)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::service;

    async fn get_text(router: axum::Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn client_side_routes_fall_back_to_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<main>desk</main>").expect("write index");
        std::fs::write(dir.path().join("app.js"), "console.log(1)").expect("write asset");

        let (status, body) = get_text(service(dir.path()), "/rfqs/RFQ-1/quotes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<main>desk</main>");

        let (status, body) = get_text(service(dir.path()), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1)");
    }

    #[tokio::test]
    async fn missing_static_dir_serves_embedded_shell() {
        let dir = tempfile::tempdir().expect("tempdir");

        let (status, body) = get_text(service(&dir.path().join("absent")), "/anything").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("rfqdesk"));
    }
}
