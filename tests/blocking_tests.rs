//! Integration tests for the blocking adapters.
//!
//! The adapters drive the async implementation on their own runtime, so
//! these tests are plain `#[test]` functions. The mock server is set up
//! with `tokio_test::block_on`; it serves requests from its own thread.

use azure_api::arm::{ArmClient, ArmError, OperationState, WaitUntil};
use azure_api::auth::{AccessToken, KeyCredential, StaticTokenCredential};
use azure_api::blocking::{BlockingConversationAnalysisClient, BlockingResource};
use azure_api::services::conversations::ConversationAnalysisClient;
use azure_api::services::machine_learning::{
    self, DeploymentLogs, DeploymentLogsContent, OnlineDeploymentData,
};
use azure_api::{ClientOptions, Endpoint};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::block_on;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYMENT_PATH: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MachineLearningServices/workspaces/ws/onlineEndpoints/ep/deployments/blue";

fn create_options(server: &MockServer) -> ClientOptions {
    ClientOptions::builder()
        .endpoint(Endpoint::new(server.uri()).unwrap())
        .poll_interval(Duration::from_millis(10))
        .max_tries(1)
        .build()
        .unwrap()
}

/// Creates a blocking handle to the test deployment.
fn create_deployment(server: &MockServer) -> BlockingResource<OnlineDeploymentData> {
    let credential = Arc::new(StaticTokenCredential::new(AccessToken::never_expiring("t")));
    let client = ArmClient::new(credential, create_options(server)).unwrap();
    let id = machine_learning::create_resource_identifier("sub", "rg", "ws", "ep", "blue").unwrap();
    BlockingResource::new(client.online_deployment(id).unwrap()).unwrap()
}

/// Mounts a mock, blocking until it is registered.
fn mount(server: &MockServer, mock: Mock) {
    block_on(mock.mount(server));
}

// ============================================================================
// Resources
// ============================================================================

#[test]
fn test_blocking_get() {
    let server = block_on(MockServer::start());
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path(DEPLOYMENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": DEPLOYMENT_PATH,
                "name": "blue",
                "location": "westus2",
                "properties": {"provisioningState": "Succeeded"}
            })))
            .expect(1),
    );

    let deployment = create_deployment(&server);
    let fetched = deployment.get().unwrap().into_inner();

    let data = fetched.inner().data().unwrap();
    assert_eq!(data.location, "westus2");
    assert_eq!(data.name.as_deref(), Some("blue"));
}

#[test]
fn test_blocking_delete_waits_for_completion() {
    let server = block_on(MockServer::start());
    mount(
        &server,
        Mock::given(method("DELETE"))
            .and(path(DEPLOYMENT_PATH))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", "/locations/1"))
            .expect(1),
    );
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/locations/1"))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(1)
            .expect(1),
    );
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/locations/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1),
    );

    let mut operation = create_deployment(&server)
        .delete(WaitUntil::Started)
        .unwrap();
    assert!(!operation.has_completed());

    operation.wait_for_completion().unwrap();
    assert_eq!(operation.state(), OperationState::Succeeded);
}

#[test]
fn test_blocking_pager_iterates_every_page() {
    let server = block_on(MockServer::start());
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path(format!("{DEPLOYMENT_PATH}/skus").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"sku": {"name": "a"}}],
                "nextLink": format!("{}/page2", server.uri())
            })))
            .expect(1),
    );
    mount(
        &server,
        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"value": [{"sku": {"name": "b"}}]})),
            )
            .expect(1),
    );

    let deployment = create_deployment(&server);
    let pager = deployment.pager(deployment.inner().get_skus(None, None).unwrap());

    let names: Vec<String> = pager
        .map(|sku| sku.unwrap().sku.unwrap().name)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_blocking_action_and_validation() {
    let server = block_on(MockServer::start());
    mount(
        &server,
        Mock::given(method("POST"))
            .and(path(format!("{DEPLOYMENT_PATH}/getLogs").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "ok"})))
            .expect(1),
    );

    let deployment = create_deployment(&server);

    let logs = deployment
        .block_on(deployment.inner().get_logs(&DeploymentLogsContent::tail(5)))
        .unwrap();
    assert_eq!(
        logs.into_inner(),
        DeploymentLogs {
            content: Some("ok".to_string())
        }
    );

    let rejected = deployment.add_tag("", "value");
    assert!(matches!(rejected, Err(ArmError::InvalidArgument { .. })));
}

// ============================================================================
// Conversation Analysis
// ============================================================================

#[test]
fn test_blocking_conversation_analysis() {
    let server = block_on(MockServer::start());
    mount(
        &server,
        Mock::given(method("POST"))
            .and(path("/language/:analyze-conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "ConversationResult",
                "result": {"prediction": {"topIntent": "Order"}}
            })))
            .expect(1),
    );

    let client = ConversationAnalysisClient::new(
        Endpoint::new(server.uri()).unwrap(),
        KeyCredential::new("key").unwrap(),
        create_options(&server),
    )
    .unwrap();
    let client = BlockingConversationAnalysisClient::new(client).unwrap();

    let response = client
        .analyze_conversation(&json!({"kind": "Conversation"}))
        .unwrap();
    assert_eq!(response["result"]["prediction"]["topIntent"], "Order");
}
