//! Lists over domains that may legitimately be empty map Vault's 404 to `[]`;
//! every other failure still surfaces.

mod common;

use common::{call_tool, call_tool_raw, handler_for, healthy_vault, vault_data, vault_error};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::Mock;

// Typed lists use Vault's LIST verb; issuers are read with `GET ?list=true`.
const SUPPRESSING_LISTS: &[(&str, &str, &str)] = &[
    ("kv2-list", "LIST", "^/v1/secret/metadata/?$"),
    ("pki-list-certificates", "LIST", "^/v1/pki/certs/?$"),
    ("pki-list-roles", "LIST", "^/v1/pki/roles/?$"),
    ("pki-list-issuers", "GET", "^/v1/pki/issuers$"),
    ("database-connections-list", "LIST", "^/v1/database/config/?$"),
    ("database-roles-list", "LIST", "^/v1/database/roles/?$"),
    ("database-static-roles-list", "LIST", "^/v1/database/static-roles/?$"),
    ("transit-encryption-keys-list", "LIST", "^/v1/transit/keys/?$"),
];

#[tokio::test]
async fn empty_domains_list_as_empty_arrays() {
    let server = healthy_vault().await;
    for (_, verb, list_path) in SUPPRESSING_LISTS {
        Mock::given(method(*verb))
            .and(path_regex(*list_path))
            .respond_with(vault_error(404, &[]))
            .expect(1)
            .mount(&server)
            .await;
    }

    let handler = handler_for(&server).await;
    for (tool, _, _) in SUPPRESSING_LISTS {
        assert_eq!(call_tool(&handler, tool, json!({})).await, json!([]), "{}", tool);
    }
}

#[tokio::test]
async fn populated_lists_return_names() {
    let server = healthy_vault().await;
    Mock::given(method("LIST"))
        .and(path_regex("^/v1/transit/keys/?$"))
        .respond_with(vault_data(json!({"keys": ["mykey", "other"]})))
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let keys = call_tool(&handler, "transit-encryption-keys-list", json!({})).await;
    assert_eq!(keys, json!(["mykey", "other"]));
}

#[tokio::test]
async fn permission_errors_are_not_suppressed() {
    let server = healthy_vault().await;
    Mock::given(method("LIST"))
        .and(path_regex("^/v1/pki/roles/?$"))
        .respond_with(vault_error(403, &["permission denied"]))
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let result = call_tool_raw(&handler, "pki-list-roles", json!({})).await;
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"].as_str().is_some_and(|t| t.contains("permission denied")));
}

#[tokio::test]
async fn policy_list_does_not_suppress_not_found() {
    let server = healthy_vault().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/policies/acl"))
        .and(query_param("list", "true"))
        .respond_with(vault_error(404, &[]))
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let result = call_tool_raw(&handler, "policies-list", json!({})).await;
    assert_eq!(result["isError"], true);
}
