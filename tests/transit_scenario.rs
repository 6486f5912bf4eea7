//! Transit encrypt/decrypt round trip through the MCP handler.

mod common;

use common::{call_tool, call_tool_raw, handler_for, healthy_vault, vault_error};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const CIPHERTEXT: &str = "vault:v1:8SDd3WHDOjf7mq69CyCqYjBXAiQQAVZRkFM13ok481zoCmHnSeDX9vyf7w==";

#[tokio::test]
async fn create_key_encrypt_decrypt() {
    let server = healthy_vault().await;

    Mock::given(method("POST"))
        .and(path("/v1/transit/keys/mykey"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/transit/encrypt/mykey"))
        .and(body_json(json!({"plaintext": "aGVsbG93b3JsZA=="})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"ciphertext": CIPHERTEXT, "key_version": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/transit/decrypt/mykey"))
        .and(body_partial_json(json!({"ciphertext": CIPHERTEXT})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"plaintext": "aGVsbG93b3JsZA=="}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;

    let created = call_tool(&handler, "transit-encryption-key-create", json!({"name": "mykey"})).await;
    assert_eq!(created, json!({"success": true}));

    let ciphertext = call_tool(
        &handler,
        "transit-encrypt-plaintext",
        json!({"name": "mykey", "text": "helloworld"}),
    )
    .await;
    assert_eq!(ciphertext, json!(CIPHERTEXT));

    let plaintext = call_tool(
        &handler,
        "transit-decrypt-ciphertext",
        json!({"name": "mykey", "text": CIPHERTEXT}),
    )
    .await;
    assert_eq!(plaintext, json!("helloworld"));
}

#[tokio::test]
async fn random_bytes_use_defaults() {
    let server = healthy_vault().await;

    Mock::given(method("POST"))
        .and(path("/v1/transit/random"))
        .and(body_json(json!({"bytes": 32, "format": "base64"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"random_bytes": "dGhpcyBpcyBub3QgcmVhbGx5IHJhbmRvbQ=="}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let bytes = call_tool(&handler, "transit-generate-random-bytes", json!({})).await;
    assert_eq!(bytes, json!("dGhpcyBpcyBub3QgcmVhbGx5IHJhbmRvbQ=="));
}

#[tokio::test]
async fn unknown_key_is_a_tool_error() {
    let server = healthy_vault().await;

    Mock::given(method("POST"))
        .and(path("/v1/transit/encrypt/missing"))
        .respond_with(vault_error(400, &["encryption key not found"]))
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let result = call_tool_raw(
        &handler,
        "transit-encrypt-plaintext",
        json!({"name": "missing", "text": "helloworld"}),
    )
    .await;

    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().expect("text");
    assert!(text.contains("encryption key not found"));
}
