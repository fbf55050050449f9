//! Integration tests for typed resource operations.
//!
//! These tests cover reads, tag management, actions and service-specific
//! collections against a mock server, including argument validation that
//! must fail before any request is sent.

use azure_api::arm::{ArmClient, ArmError, ResourceIdentifier, WaitUntil};
use azure_api::auth::{AccessToken, StaticTokenCredential};
use azure_api::services::cosmos_db::{self, OperationType, RestorableDatabaseAccountResource};
use azure_api::services::machine_learning::{
    self, DeploymentLogs, DeploymentLogsContent, OnlineDeploymentResource,
};
use azure_api::{ApiVersion, ClientOptions, Endpoint};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYMENT_PATH: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MachineLearningServices/workspaces/ws/onlineEndpoints/ep/deployments/blue";
const TAGS_PATH: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MachineLearningServices/workspaces/ws/onlineEndpoints/ep/deployments/blue/providers/Microsoft.Resources/tags/default";
const ACCOUNT_PATH: &str = "/subscriptions/sub/providers/Microsoft.DocumentDB/locations/westus/restorableDatabaseAccounts/abc";

/// Creates client options that point at the mock server.
fn create_options(server: &MockServer) -> ClientOptions {
    ClientOptions::builder()
        .endpoint(Endpoint::new(server.uri()).unwrap())
        .poll_interval(Duration::from_millis(10))
        .max_tries(1)
        .build()
        .unwrap()
}

/// Creates an ARM client that authenticates with a fixed token.
fn create_client(options: ClientOptions) -> ArmClient {
    let credential = Arc::new(StaticTokenCredential::new(AccessToken::never_expiring(
        "test-token",
    )));
    ArmClient::new(credential, options).unwrap()
}

fn create_deployment(server: &MockServer) -> OnlineDeploymentResource {
    let id = machine_learning::create_resource_identifier("sub", "rg", "ws", "ep", "blue").unwrap();
    create_client(create_options(server))
        .online_deployment(id)
        .unwrap()
}

fn create_account(server: &MockServer) -> RestorableDatabaseAccountResource {
    let id = cosmos_db::create_resource_identifier("sub", "westus", "abc").unwrap();
    create_client(create_options(server))
        .restorable_database_account(id)
        .unwrap()
}

/// Builds a deployment body carrying the given tags.
fn deployment_body(tags: serde_json::Value) -> serde_json::Value {
    json!({
        "id": DEPLOYMENT_PATH,
        "name": "blue",
        "type": "Microsoft.MachineLearningServices/workspaces/onlineEndpoints/deployments",
        "location": "westus2",
        "tags": tags,
        "kind": "Managed",
        "properties": {
            "endpointComputeType": "Managed",
            "provisioningState": "Succeeded",
            "instanceType": "Standard_DS3_v2",
            "appInsightsEnabled": false
        },
        "sku": {"name": "Default", "capacity": 1}
    })
}

fn tags_body(tags: serde_json::Value) -> serde_json::Value {
    json!({"properties": {"tags": tags}})
}

/// Mounts the final re-read of the deployment.
async fn mount_deployment_get(server: &MockServer, tags: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body(tags)))
        .expect(1)
        .mount(server)
        .await;
}

fn tag_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// Get
// ============================================================================

#[tokio::test]
async fn test_get_returns_resource_with_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .and(query_param("api-version", "2022-10-01"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-request-id", "req-1")
                .set_body_json(deployment_body(json!({"env": "dev"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let deployment = create_deployment(&server);
    assert!(!deployment.has_data());

    let response = deployment.get().await.unwrap();
    assert_eq!(response.request_id(), Some("req-1"));
    assert_eq!(response.raw_response().code, 200);

    let data = response.data().unwrap();
    assert_eq!(data.location, "westus2");
    assert_eq!(data.kind.as_deref(), Some("Managed"));
    assert_eq!(data.tags.get("env").map(String::as_str), Some("dev"));
    assert_eq!(
        data.properties.instance_type.as_deref(),
        Some("Standard_DS3_v2")
    );
    assert_eq!(
        data.properties.additional.get("appInsightsEnabled"),
        Some(&json!(false))
    );
    assert_eq!(data.sku.as_ref().unwrap().capacity, Some(1));
    assert_eq!(response.id().as_str(), DEPLOYMENT_PATH);
}

#[tokio::test]
async fn test_get_with_empty_body_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let error = create_deployment(&server).get().await.unwrap_err();
    assert!(matches!(
        error,
        ArmError::NotFound {
            resource: "OnlineDeployment",
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_with_truncated_body_is_invalid_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": "/subscriptions/sub"#))
        .expect(1)
        .mount(&server)
        .await;

    let error = create_deployment(&server).get().await.unwrap_err();
    assert!(matches!(error, ArmError::InvalidPayload { ref target, .. } if target == "OnlineDeployment"));
}

#[tokio::test]
async fn test_get_failure_carries_status_and_request_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-ms-request-id", "req-404")
                .set_body_json(json!({
                    "error": {"code": "ResourceNotFound", "message": "Deployment blue was not found"}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = create_deployment(&server).get().await.unwrap_err();

    assert_eq!(error.status(), Some(404));
    assert_eq!(error.request_id(), Some("req-404"));
    match error {
        ArmError::RequestFailed(e) => {
            assert_eq!(e.error_code.as_deref(), Some("ResourceNotFound"));
            assert_eq!(e.message, "Deployment blue was not found");
        }
        other => panic!("Expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_version_override_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DEPLOYMENT_PATH))
        .and(query_param("api-version", "2023-04-01-preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body(json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions::builder()
        .endpoint(Endpoint::new(server.uri()).unwrap())
        .api_version(
            "Microsoft.MachineLearningServices/workspaces/onlineEndpoints/deployments",
            ApiVersion::new("2023-04-01-preview").unwrap(),
        )
        .build()
        .unwrap();
    let id = machine_learning::create_resource_identifier("sub", "rg", "ws", "ep", "blue").unwrap();
    let deployment = create_client(options).online_deployment(id).unwrap();

    assert_eq!(deployment.api_version(), "2023-04-01-preview");
    deployment.get().await.unwrap();
}

#[tokio::test]
async fn test_handle_rejects_ids_of_other_types() {
    let server = MockServer::start().await;
    let client = create_client(create_options(&server));

    let account_id = cosmos_db::create_resource_identifier("sub", "westus", "abc").unwrap();
    let result = client.online_deployment(account_id);

    assert!(matches!(result, Err(ArmError::TypeMismatch { .. })));
}

// ============================================================================
// Tags
// ============================================================================

#[tokio::test]
async fn test_add_tag_merges_with_existing_tags() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TAGS_PATH))
        .and(query_param("api-version", "2021-04-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(json!({"env": "dev"}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(TAGS_PATH))
        .and(body_json(tags_body(json!({"env": "dev", "team": "ml"}))))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tags_body(json!({"env": "dev", "team": "ml"}))),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_deployment_get(&server, json!({"env": "dev", "team": "ml"})).await;

    let response = create_deployment(&server)
        .add_tag("team", "ml")
        .await
        .unwrap();

    let tags = &response.data().unwrap().tags;
    assert_eq!(tags, &tag_map(&[("env", "dev"), ("team", "ml")]));
}

#[tokio::test]
async fn test_remove_tag_writes_remaining_tags() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TAGS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tags_body(json!({"env": "dev", "team": "ml"}))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(TAGS_PATH))
        .and(body_json(tags_body(json!({"env": "dev"}))))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(json!({"env": "dev"}))))
        .expect(1)
        .mount(&server)
        .await;
    mount_deployment_get(&server, json!({"env": "dev"})).await;

    let response = create_deployment(&server).remove_tag("team").await.unwrap();

    assert_eq!(response.data().unwrap().tags, tag_map(&[("env", "dev")]));
}

#[tokio::test]
async fn test_set_tags_replaces_every_tag() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(TAGS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TAGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(json!({}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(TAGS_PATH))
        .and(body_json(tags_body(json!({"owner": "alice"}))))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tags_body(json!({"owner": "alice"}))),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_deployment_get(&server, json!({"owner": "alice"})).await;

    let response = create_deployment(&server)
        .set_tags(tag_map(&[("owner", "alice")]))
        .await
        .unwrap();

    assert_eq!(response.data().unwrap().tags, tag_map(&[("owner", "alice")]));
}

#[tokio::test]
async fn test_empty_tag_names_are_rejected_without_requests() {
    let server = MockServer::start().await;
    let deployment = create_deployment(&server);

    let added = deployment.add_tag("", "value").await;
    assert!(matches!(added, Err(ArmError::InvalidArgument { name: "key", .. })));

    let removed = deployment.remove_tag("").await;
    assert!(matches!(removed, Err(ArmError::InvalidArgument { name: "key", .. })));

    let replaced = deployment.set_tags(tag_map(&[("", "value")])).await;
    assert!(matches!(
        replaced,
        Err(ArmError::InvalidArgument { name: "tags", .. })
    ));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

// ============================================================================
// Actions and Unsupported Operations
// ============================================================================

#[tokio::test]
async fn test_get_logs_posts_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DEPLOYMENT_PATH}/getLogs").as_str()))
        .and(query_param("api-version", "2022-10-01"))
        .and(body_json(json!({"containerType": "InferenceServer", "tail": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "ready\n"})))
        .expect(1)
        .mount(&server)
        .await;

    let logs = create_deployment(&server)
        .get_logs(&DeploymentLogsContent::tail(10))
        .await
        .unwrap();

    assert_eq!(
        logs.into_inner(),
        DeploymentLogs {
            content: Some("ready\n".to_string())
        }
    );
}

#[tokio::test]
async fn test_action_with_non_json_body_is_invalid_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DEPLOYMENT_PATH}/getLogs").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let error = create_deployment(&server)
        .get_logs(&DeploymentLogsContent::tail(10))
        .await
        .unwrap_err();
    assert!(matches!(error, ArmError::InvalidPayload { ref target, .. } if target == "getLogs"));
}

#[tokio::test]
async fn test_cosmos_account_cannot_be_updated() {
    let server = MockServer::start().await;

    let result = create_account(&server).update(WaitUntil::Completed, &()).await;

    assert!(matches!(
        result,
        Err(ArmError::OperationNotSupported {
            resource: "RestorableDatabaseAccount",
            ..
        })
    ));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

// ============================================================================
// Cosmos DB
// ============================================================================

#[tokio::test]
async fn test_get_restorable_account() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .and(query_param("api-version", "2022-08-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ACCOUNT_PATH,
            "name": "abc",
            "location": "West US",
            "properties": {"accountName": "ddb1", "apiType": "MongoDB"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = create_account(&server).get().await.unwrap();
    let properties = response.data().unwrap().properties.as_ref().unwrap();

    assert_eq!(properties.account_name.as_deref(), Some("ddb1"));
    assert_eq!(properties.api_type.as_deref(), Some("MongoDB"));
}

#[tokio::test]
async fn test_list_restorable_mongodb_databases() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT_PATH}/restorableMongodbDatabases").as_str()))
        .and(query_param("api-version", "2022-08-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "name": "e1",
                    "properties": {"resource": {"_rid": "r1", "operationType": "Create", "ownerId": "db1"}}
                },
                {
                    "name": "e2",
                    "properties": {"resource": {"_rid": "r2", "operationType": "Delete", "ownerId": "db1"}}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let databases = create_account(&server)
        .get_restorable_mongodb_databases()
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    let operations: Vec<_> = databases
        .iter()
        .map(|d| d.resource.as_ref().unwrap().operation_type.clone().unwrap())
        .collect();
    assert_eq!(operations, vec![OperationType::Create, OperationType::Delete]);
    assert_eq!(databases[0].resource.as_ref().unwrap().rid.as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_null_database_properties_fail_the_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT_PATH}/restorableMongodbDatabases").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"name": "e1", "properties": null}]
        })))
        .mount(&server)
        .await;

    let result = create_account(&server)
        .get_restorable_mongodb_databases()
        .unwrap()
        .collect_all()
        .await;

    assert!(matches!(result, Err(ArmError::InvalidPayload { .. })));
}

#[tokio::test]
async fn test_resource_handles_compare_by_id() {
    let server = MockServer::start().await;
    let deployment = create_deployment(&server);

    let parsed = ResourceIdentifier::parse(DEPLOYMENT_PATH).unwrap();
    assert_eq!(deployment.id(), &parsed);
    assert_eq!(deployment.id().parent().unwrap().name(), "ep");
}
