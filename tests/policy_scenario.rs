//! ACL policy lifecycle, including cache invalidation between list calls.

mod common;

use common::{call_tool, handler_for, healthy_vault, vault_error};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn policy_list(names: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {"keys": names, "policies": names}
    }))
}

#[tokio::test]
async fn create_list_delete_list() {
    let server = healthy_vault().await;
    let document = json!({"path": {"secret/data/*": {"capabilities": []}}});

    Mock::given(method("PUT"))
        .and(path("/v1/sys/policies/acl/mypolicy"))
        .and(body_json(json!({
            "policy": serde_json::to_string(&document).expect("policy json")
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/policies/acl"))
        .and(query_param("list", "true"))
        .respond_with(policy_list(&["default", "mypolicy", "root"]))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/sys/policies/acl/mypolicy"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;

    let created = call_tool(
        &handler,
        "policy-create-or-update",
        json!({"name": "mypolicy", "policy": document}),
    )
    .await;
    assert_eq!(created, json!({"success": true}));

    let listed = call_tool(&handler, "policies-list", json!({})).await;
    let names: Vec<&str> = listed.as_array().expect("array").iter().filter_map(|v| v.as_str()).collect();
    for expected in ["mypolicy", "default", "root"] {
        assert!(names.contains(&expected), "{} missing from {:?}", expected, names);
    }

    // Repeated read is served from the cache.
    assert_eq!(call_tool(&handler, "policies-list", json!({})).await, listed);

    Mock::given(method("GET"))
        .and(path("/v1/sys/policies/acl"))
        .and(query_param("list", "true"))
        .respond_with(policy_list(&["default", "root"]))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = call_tool(&handler, "policy-delete", json!({"name": "mypolicy"})).await;
    assert_eq!(deleted, json!({"success": true}));

    let listed = call_tool(&handler, "policies-list", json!({})).await;
    assert_eq!(listed, json!(["default", "root"]));
}

#[tokio::test]
async fn hcl_policy_text_is_sent_verbatim() {
    let server = healthy_vault().await;
    let hcl = "path \"secret/data/app\" {\n  capabilities = [\"read\"]\n}";

    Mock::given(method("PUT"))
        .and(path("/v1/sys/policies/acl/app-read"))
        .and(body_json(json!({"policy": hcl})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/policies/acl/app-read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "app-read", "policy": hcl}
        })))
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let created =
        call_tool(&handler, "policy-create-or-update", json!({"name": "app-read", "policy": hcl})).await;
    assert_eq!(created, json!({"success": true}));

    let read = call_tool(&handler, "policy-read", json!({"name": "app-read"})).await;
    assert_eq!(read["policy"], hcl);
}

#[tokio::test]
async fn deleting_builtin_policy_is_flagged() {
    let server = healthy_vault().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/sys/policies/acl/root"))
        .respond_with(vault_error(400, &["cannot delete \"root\" policy"]))
        .mount(&server)
        .await;

    let handler = handler_for(&server).await;
    let deleted = call_tool(&handler, "policy-delete", json!({"name": "root"})).await;
    assert_eq!(deleted["success"], false);
    assert!(deleted["error"].as_str().is_some_and(|e| e.contains("root")));
}
