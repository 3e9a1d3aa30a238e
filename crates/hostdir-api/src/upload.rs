//! File upload into the web root.
//!
//! Stored files are named `<upload_prefix><client file name>` and are served
//! back by the static asset fallback.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use crate::ApiState;

/// Whether `name` can be placed directly inside the web root.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// POST /api/upload
///
/// Expects a multipart form with a `file` part. Answers with the stored
/// file name. Names that would escape the web root are dropped with an
/// empty 200.
pub async fn upload_file(State(state): State<ApiState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (e.status(), e.body_text()).into_response(),
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return (e.status(), e.body_text()).into_response(),
        };

        if !is_plain_file_name(&file_name) {
            warn!(%file_name, "upload refused");
            return StatusCode::OK.into_response();
        }

        let stored = format!("{}{}", state.web.upload_prefix, file_name);
        let path = state.web.root.join(&stored);
        if let Err(e) = tokio::fs::write(&path, &data).await {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("write {} failed: {e}", path.display()),
            )
                .into_response();
        }
        info!(file = %stored, bytes = data.len(), "upload stored");
        return (StatusCode::OK, stored).into_response();
    }

    (StatusCode::BAD_REQUEST, "missing file").into_response()
}
