//! Shared scratch clipboard.
//!
//! One process-wide text buffer for moving snippets between devices. It
//! lives in memory only and starts empty on every restart.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::RwLock;

use crate::ApiState;

#[derive(Clone, Default)]
pub struct Clipboard {
    content: Arc<RwLock<String>>,
}

impl Clipboard {
    pub async fn get(&self) -> String {
        self.content.read().await.clone()
    }

    pub async fn set(&self, content: String) {
        *self.content.write().await = content;
    }
}

/// GET /api/cp
pub async fn read(State(state): State<ApiState>) -> String {
    state.clipboard.get().await
}

/// POST /api/cp
///
/// Body is a JSON object of strings; `content` replaces the buffer and a
/// missing `content` key clears it.
pub async fn write(State(state): State<ApiState>, body: Bytes) -> Response {
    let mut fields: HashMap<String, String> = match serde_json::from_slice(&body) {
        Ok(fields) => fields,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let content = fields.remove("content").unwrap_or_default();
    state.clipboard.set(content).await;
    StatusCode::OK.into_response()
}
