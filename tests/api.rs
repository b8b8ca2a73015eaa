//! Submission API behavior over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pathway_rs::{api, InMemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    api::router(Arc::new(InMemoryStore::new()))
}

fn new_message_body() -> Value {
    json!({
        "block_confirmation_in_ms": "780000",
        "original_path": {
            "from_chain": "base",
            "to_chain": "noble",
            "sender_address": "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504",
            "receiver_address": "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek",
            "amount": "25000000",
            "fee": "660000"
        }
    })
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn unknown_key_is_404() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/message/0xdeadbeef")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submission_round_trips_through_get() {
    let app = router();

    let response = app
        .clone()
        .oneshot(post("/message/new?tx_hash=0xABCDEF", &new_message_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1 << 16).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["key"], "0xabcdef");

    // Lookup is case-insensitive because keys normalize on both ends.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/message/0xAbCdEf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1 << 16).await.unwrap();
    let record: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(record["status"], "waiting");
    assert_eq!(record["block_confirmation_in_ms"], "780000");
    assert_eq!(record["original_path"]["to_chain"], "noble");
}

#[tokio::test]
async fn submission_keeps_parsed_burn_fields() {
    let app = router();

    // A record submitted as pending already carries its parsed burn; the
    // attestation stage polls by the stored hash, so losing any of these
    // fields would strand the transfer.
    let mut body = new_message_body();
    let fields = body.as_object_mut().unwrap();
    fields.insert("status".into(), json!("pending"));
    fields.insert("nonce".into(), json!("273585"));
    fields.insert("message_bytes".into(), json!(format!("0x{}", "11".repeat(248))));
    fields.insert(
        "message_hash".into(),
        json!("0xd9657b42de5ef3c00661a6b7549fa46e733b2bb6df65c6e7a2b1e03bf15e26ac"),
    );
    fields.insert("destination_block_height_at_deposit".into(), json!("123456"));

    let response = app
        .clone()
        .oneshot(post("/message/new?tx_hash=0xbb", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/message/0xbb")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1 << 16).await.unwrap();
    let record: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(record["status"], "pending");
    assert_eq!(record["nonce"], "273585");
    assert_eq!(
        record["message_hash"],
        "0xd9657b42de5ef3c00661a6b7549fa46e733b2bb6df65c6e7a2b1e03bf15e26ac"
    );
    assert_eq!(record["destination_block_height_at_deposit"], "123456");
    assert_eq!(record["message_bytes"], format!("0x{}", "11".repeat(248)));
}

#[tokio::test]
async fn duplicate_submission_is_409() {
    let app = router();
    let body = new_message_body();

    let first = app
        .clone()
        .oneshot(post("/message/new?tx_hash=0xaa", &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Same transfer under the legacy parameter spelling is still a duplicate.
    let second = app
        .oneshot(post("/message/new?partition_key=0xAA", &body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_fields_are_400() {
    let app = router();

    let no_key = app
        .clone()
        .oneshot(post("/message/new", &new_message_body()))
        .await
        .unwrap();
    assert_eq!(no_key.status(), StatusCode::BAD_REQUEST);

    let mut body = new_message_body();
    body.as_object_mut().unwrap().remove("original_path");
    let no_path = app
        .clone()
        .oneshot(post("/message/new?tx_hash=0xaa", &body))
        .await
        .unwrap();
    assert_eq!(no_path.status(), StatusCode::BAD_REQUEST);

    let mut body = new_message_body();
    body.as_object_mut().unwrap().remove("block_confirmation_in_ms");
    let no_confirmation = app
        .oneshot(post("/message/new?tx_hash=0xaa", &body))
        .await
        .unwrap();
    assert_eq!(no_confirmation.status(), StatusCode::BAD_REQUEST);
}
