//! Static file fallback.
//!
//! Request paths are flattened to a single file name inside the web root:
//! every `/` is dropped and leading dots are trimmed, so nothing outside the
//! root is reachable. An empty name means `index.html`. The file itself is
//! served by `tower_http`'s `ServeFile`, which handles content types, `HEAD`,
//! ranges and conditional requests.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::ApiState;

/// File name a request path maps to.
pub fn asset_name(path: &str) -> String {
    let flat: String = path.chars().filter(|c| !matches!(c, '/' | '\\')).collect();
    match flat.trim_start_matches('.') {
        "" => "index.html".to_string(),
        name => name.to_string(),
    }
}

/// Fallback for every unrouted request.
pub async fn serve_asset(State(state): State<ApiState>, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.web.root.join(asset_name(request.uri().path()));
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return StatusCode::NOT_FOUND.into_response(),
    }

    match ServeFile::new(&path).oneshot(request).await {
        Ok(resp) => resp.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use hostdir_core::WebConfig;
    use hostdir_store::RecordStore;
    use tempfile::TempDir;

    fn test_state() -> (TempDir, ApiState) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("hosts.csv")).unwrap();
        let web = WebConfig {
            root: Some(dir.path().to_path_buf()),
            ..WebConfig::default()
        };
        std::fs::write(dir.path().join("notes.txt"), "0123456789").unwrap();
        (dir, ApiState::new(store, &web))
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn root_maps_to_index() {
        assert_eq!(asset_name("/"), "index.html");
        assert_eq!(asset_name(""), "index.html");
        assert_eq!(asset_name("/./"), "index.html");
    }

    #[test]
    fn nested_paths_are_flattened() {
        assert_eq!(asset_name("/index.js"), "index.js");
        assert_eq!(asset_name("/static/app.css"), "staticapp.css");
        assert_eq!(asset_name("/../../etc/passwd"), "etcpasswd");
        assert_eq!(asset_name("/..\\secret"), "secret");
    }

    #[tokio::test]
    async fn serves_file_with_content_type() {
        let (_dir, state) = test_state();
        let resp = serve_asset(State(state), request(Method::GET, "/notes.txt")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body_text(resp).await, "0123456789");
    }

    #[tokio::test]
    async fn head_has_length_but_no_body() {
        let (_dir, state) = test_state();
        let resp = serve_asset(State(state), request(Method::HEAD, "/notes.txt")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "10");
        assert_eq!(body_text(resp).await, "");
    }

    #[tokio::test]
    async fn range_request_is_partial() {
        let (_dir, state) = test_state();
        let mut req = request(Method::GET, "/notes.txt");
        req.headers_mut()
            .insert(header::RANGE, "bytes=2-4".parse().unwrap());

        let resp = serve_asset(State(state), req).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_text(resp).await, "234");
    }

    #[tokio::test]
    async fn other_methods_and_directories_are_not_found() {
        let (dir, state) = test_state();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let resp = serve_asset(State(state.clone()), request(Method::DELETE, "/notes.txt")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = serve_asset(State(state), request(Method::GET, "/sub")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
