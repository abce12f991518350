//! HTTP route handlers for the chain query service.
//!
//! Read-only views over the registry plus a JSON-RPC relay through each
//! chain's fallback client. `{chain}` path segments accept a decimal id, a
//! hex id (`0x89`), a CAIP-2 id (`eip155:137`) or an exact chain name.
//!
//! Status codes:
//! - unknown chain → 404
//! - malformed chain id or request body → 400
//! - every RPC endpoint failed → 502
//!
//! RPC URLs leave the service as scheme and host only. The one exception is
//! the wallet add payload, whose registration endpoint the wallet must dial.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::chain::{ChainId, ChainRecord, ChainSelector, redact_endpoint};
use crate::networks::Networks;
use crate::rpc::{JsonRpcRequest, RpcError};

/// Shared state for the route handlers.
pub type NetworksState = Arc<Networks>;

/// Creates the router with every query endpoint.
pub fn routes() -> Router<NetworksState> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
        .route("/chains", get(get_chains))
        .route("/chains/{chain}", get(get_chain))
        .route("/chains/{chain}/wallet-requests", get(get_wallet_requests))
        .route("/names/{chain_id}", get(get_name))
        .route("/rpc/{chain_id}", post(post_rpc))
}

/// Record plus its endpoint roles, all redacted to scheme and host.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainView<'a> {
    #[serde(flatten)]
    record: &'a ChainRecord,
    primary_endpoint: Option<String>,
    registration_endpoint: Option<String>,
}

impl<'a> From<&'a ChainRecord> for ChainView<'a> {
    fn from(record: &'a ChainRecord) -> Self {
        Self {
            record,
            primary_endpoint: record.primary_endpoint().map(redact_endpoint),
            registration_endpoint: record.registration_endpoint().map(redact_endpoint),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn unknown_chain(chain: impl std::fmt::Display) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("unknown chain: {chain}"))
}

fn parse_chain_id(raw: &str) -> Result<ChainId, Response> {
    raw.parse::<ChainId>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

/// `GET /` — simple greeting.
async fn get_root() -> impl IntoResponse {
    (
        StatusCode::OK,
        concat!("Hello from ", env!("CARGO_PKG_NAME"), "!"),
    )
}

/// `GET /health` — lightweight liveness check.
async fn get_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `GET /chains` — every registry record, in table order.
#[instrument(skip_all)]
async fn get_chains(State(networks): State<NetworksState>) -> impl IntoResponse {
    let chains: Vec<&ChainRecord> = networks.registry().iter().collect();
    (StatusCode::OK, Json(json!({ "chains": chains })))
}

/// `GET /chains/{chain}` — one record with its primary and registration
/// endpoints.
#[instrument(skip(networks))]
async fn get_chain(
    State(networks): State<NetworksState>,
    Path(chain): Path<String>,
) -> Response {
    let selector = ChainSelector::from_input(&chain);
    match networks.registry().find(&selector) {
        Some(record) => (StatusCode::OK, Json(ChainView::from(record))).into_response(),
        None => unknown_chain(selector),
    }
}

/// `GET /chains/{chain}/wallet-requests` — the switch and add payloads a
/// client-side wallet integration should send.
#[instrument(skip(networks))]
async fn get_wallet_requests(
    State(networks): State<NetworksState>,
    Path(chain): Path<String>,
) -> Response {
    let selector = ChainSelector::from_input(&chain);
    match networks.wallet_requests(&selector) {
        Some(requests) => (StatusCode::OK, Json(requests)).into_response(),
        None => unknown_chain(selector),
    }
}

/// `GET /names/{chain_id}` — display name, or the unsupported sentinel.
#[instrument(skip(networks))]
async fn get_name(
    State(networks): State<NetworksState>,
    Path(chain_id): Path<String>,
) -> Response {
    let chain_id = match parse_chain_id(&chain_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let name = networks.resolve_chain_name(chain_id);
    (
        StatusCode::OK,
        Json(json!({ "chainId": chain_id, "name": name })),
    )
        .into_response()
}

/// `POST /rpc/{chain_id}` — relays one JSON-RPC request through the chain's
/// fallback client.
///
/// JSON-RPC error objects are relayed with HTTP 200; only a request that no
/// endpoint answered yields 502.
#[instrument(skip(networks, body))]
async fn post_rpc(
    State(networks): State<NetworksState>,
    Path(chain_id): Path<String>,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let chain_id = match parse_chain_id(&chain_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Ok(client) = networks.get_read_client(chain_id) else {
        return unknown_chain(chain_id);
    };
    let Ok(Json(request)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "invalid JSON-RPC request body");
    };

    let caller_id = request.id.clone();
    match client.request(&request.method, request.params).await {
        Ok(mut response) => {
            response.id = caller_id;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(RpcError::AllEndpointsFailed { failures }) => {
            tracing::error!(%chain_id, endpoints = failures.len(), "no RPC endpoint answered");
            let failures: Vec<_> = failures
                .iter()
                .map(|f| json!({ "endpoint": f.endpoint, "error": f.error.to_string() }))
                .collect();
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "all RPC endpoints failed", "failures": failures })),
            )
                .into_response()
        }
        Err(error) => error_response(StatusCode::BAD_GATEWAY, error.to_string()),
    }
}
