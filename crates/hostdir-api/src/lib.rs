//! hostdir-api — HTTP API for hostdir.
//!
//! Plain-text request/response glue around the record store, plus the
//! small web extras the service ships with.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/host?alias=A` | Host bound to `A` (empty body if none) |
//! | POST | `/api/host` | Bind an alias: `{"host", "alias", "date"}` |
//! | GET | `/api/date?alias=A` | Last update time of `A`'s host |
//! | POST | `/api/date` | Refresh a host's update time |
//! | GET | `/api/cp` | Read the shared clipboard |
//! | POST | `/api/cp` | Replace the clipboard: `{"content"}` |
//! | POST | `/api/upload` | Multipart upload into the web root |
//! | GET | `/*` | Static files from the web root |

pub mod assets;
pub mod clipboard;
pub mod handlers;
pub mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use hostdir_core::WebConfig;
use hostdir_store::RecordStore;

use crate::clipboard::Clipboard;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: RecordStore,
    pub clipboard: Clipboard,
    pub web: Arc<WebSettings>,
}

/// Resolved web settings.
#[derive(Debug, Clone)]
pub struct WebSettings {
    pub root: PathBuf,
    pub upload_prefix: String,
}

impl ApiState {
    pub fn new(store: RecordStore, web: &WebConfig) -> Self {
        Self {
            store,
            clipboard: Clipboard::default(),
            web: Arc::new(WebSettings {
                root: web.resolved_root(),
                upload_prefix: web.upload_prefix.clone(),
            }),
        }
    }
}

/// Build the complete router (alias API + clipboard + upload + assets).
pub fn build_router(store: RecordStore, web: &WebConfig) -> Router {
    let state = ApiState::new(store, web);

    Router::new()
        .route("/api/host", get(handlers::get_host).post(handlers::bind_host))
        .route("/api/date", get(handlers::get_date).post(handlers::update_date))
        .route("/api/cp", get(clipboard::read).post(clipboard::write))
        .route("/api/upload", post(upload::upload_file))
        .fallback(assets::serve_asset)
        .layer(DefaultBodyLimit::max(web.max_upload_bytes))
        .with_state(state)
}
