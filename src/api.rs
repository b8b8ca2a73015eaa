//! Submission API.
//!
//! Two routes: record lookup by key, and submission of a new transfer
//! record for the relay pipeline to pick up. Submissions arrive keyed by
//! either `tx_hash` or the legacy `partition_key` query parameter; both
//! normalize to the same [`MessageKey`].

use std::sync::Arc;

use alloy_primitives::{Bytes, FixedBytes};
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PathwayError;
use crate::message::{Call, MessageKey, ReceiveMessage, Status};
use crate::path::Path;
use crate::store::MessageStore;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn MessageStore>,
}

pub fn router(store: Arc<dyn MessageStore>) -> Router {
    Router::new()
        .route("/message/{key}", get(get_message))
        .route("/message/new", post(new_message))
        .with_state(ApiState { store })
}

async fn get_message(
    State(state): State<ApiState>,
    AxumPath(key): AxumPath<String>,
) -> Result<Json<ReceiveMessage>, (StatusCode, String)> {
    let key = MessageKey::new(key);
    match state.store.get(&key).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("no record for {key}"))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct KeyParams {
    tx_hash: Option<String>,
    partition_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewMessageRequest {
    #[serde(default, deserialize_with = "opt_u64_decimal")]
    block_confirmation_in_ms: Option<u64>,
    original_path: Option<Path>,
    status: Option<Status>,
    #[serde(default, deserialize_with = "opt_u64_decimal")]
    nonce: Option<u64>,
    message_bytes: Option<Bytes>,
    message_hash: Option<FixedBytes<32>>,
    #[serde(default, deserialize_with = "opt_u64_decimal")]
    destination_block_height_at_deposit: Option<u64>,
    #[serde(default)]
    calls: Vec<Call>,
}

#[derive(Debug, Serialize)]
struct NewMessageResponse {
    key: MessageKey,
}

async fn new_message(
    State(state): State<ApiState>,
    Query(params): Query<KeyParams>,
    Json(request): Json<NewMessageRequest>,
) -> Result<Json<NewMessageResponse>, (StatusCode, String)> {
    let key = params
        .tx_hash
        .or(params.partition_key)
        .filter(|k| !k.trim().is_empty())
        .map(MessageKey::new)
        .ok_or((
            StatusCode::BAD_REQUEST,
            "tx_hash or partition_key query parameter is required".to_string(),
        ))?;

    let Some(block_confirmation_in_ms) = request.block_confirmation_in_ms else {
        return Err((
            StatusCode::BAD_REQUEST,
            "block_confirmation_in_ms is required".to_string(),
        ));
    };
    let Some(original_path) = request.original_path else {
        return Err((
            StatusCode::BAD_REQUEST,
            "original_path is required".to_string(),
        ));
    };

    let record = ReceiveMessage::builder()
        .key(key.clone())
        .status(request.status.unwrap_or(Status::Waiting))
        .maybe_nonce(request.nonce)
        .maybe_message_bytes(request.message_bytes)
        .maybe_message_hash(request.message_hash)
        .maybe_destination_block_height_at_deposit(request.destination_block_height_at_deposit)
        .block_confirmation_in_ms(block_confirmation_in_ms)
        .original_path(original_path)
        .calls(request.calls)
        .submitted_at(Utc::now())
        .build();

    match state.store.put_if_absent(record).await {
        Ok(()) => {
            info!(key = %key, "transfer record accepted");
            Ok(Json(NewMessageResponse { key }))
        }
        Err(PathwayError::DuplicateRecord { key }) => Err((
            StatusCode::CONFLICT,
            format!("record already exists for {key}"),
        )),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

fn opt_u64_decimal<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| raw.parse().map_err(serde::de::Error::custom))
        .transpose()
}
