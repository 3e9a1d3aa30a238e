//! Alias API handlers.
//!
//! Lookups answer with the bare value as `text/plain`; a miss is an empty
//! 200 body rather than an error. Registrations take a JSON body and answer
//! with an empty 200, or a plain-text error message.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hostdir_store::{StoreError, StoreResult};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ApiState;

/// `?alias=` query of the lookup endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AliasQuery {
    #[serde(default)]
    pub alias: String,
}

/// Body of `POST /api/host` and `POST /api/date`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Payload {
    pub host: String,
    pub alias: String,
    pub date: String,
}

fn text_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, msg.into()).into_response()
}

fn lookup_response(result: StoreResult<String>) -> Response {
    match result {
        Ok(value) => value.into_response(),
        Err(e) if e.is_not_found() => StatusCode::OK.into_response(),
        Err(e) => text_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn mutation_response(result: StoreResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e @ StoreError::AliasConflict { .. }) => text_error(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            warn!(error = %e, "record store mutation failed");
            text_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn parse_payload(body: &[u8]) -> Result<Payload, Response> {
    serde_json::from_slice(body).map_err(|e| text_error(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Run a store mutation off the async workers; it rewrites the record file.
async fn run_mutation<F>(state: &ApiState, op: F) -> Response
where
    F: FnOnce(&hostdir_store::RecordStore) -> StoreResult<()> + Send + 'static,
{
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || op(&store)).await {
        Ok(result) => mutation_response(result),
        Err(e) => text_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

// ── Hosts ──────────────────────────────────────────────────────

/// GET /api/host?alias=
pub async fn get_host(State(state): State<ApiState>, Query(q): Query<AliasQuery>) -> Response {
    lookup_response(state.store.resolve_host(&q.alias))
}

/// POST /api/host
///
/// Unlike `POST /api/date`, an empty `alias` is refused as `missing
/// parameter` here. The store would accept it and bind the empty string,
/// which then matches every record with an empty field.
pub async fn bind_host(State(state): State<ApiState>, body: Bytes) -> Response {
    let payload = match parse_payload(&body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if payload.host.is_empty() || payload.date.is_empty() || payload.alias.is_empty() {
        return text_error(StatusCode::BAD_REQUEST, "missing parameter");
    }

    debug!(host = %payload.host, alias = %payload.alias, "bind alias");
    run_mutation(&state, move |store| {
        store.bind_alias(&payload.host, &payload.alias, &payload.date)
    })
    .await
}

// ── Update times ───────────────────────────────────────────────

/// GET /api/date?alias=
pub async fn get_date(State(state): State<ApiState>, Query(q): Query<AliasQuery>) -> Response {
    lookup_response(state.store.resolve_timestamp(&q.alias))
}

/// POST /api/date
pub async fn update_date(State(state): State<ApiState>, body: Bytes) -> Response {
    let payload = match parse_payload(&body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if payload.host.is_empty() || payload.date.is_empty() {
        return text_error(StatusCode::BAD_REQUEST, "missing parameter");
    }

    debug!(host = %payload.host, date = %payload.date, "update time");
    run_mutation(&state, move |store| {
        store.update_timestamp(&payload.host, &payload.alias, &payload.date)
    })
    .await
}
