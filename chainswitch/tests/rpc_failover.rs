use std::time::Duration;

use chainswitch::chain::{ChainId, ChainRecord, ChainRegistry};
use chainswitch::networks::Networks;
use chainswitch::rpc::{FallbackClient, RpcError, RpcOptions, TransportError};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

async fn server_answering(response: ResponseTemplate, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

/// Address nothing listens on.
fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn unavailable_endpoint_falls_back_in_order() {
    let down = server_answering(ResponseTemplate::new(503), 1).await;
    let up = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(rpc_result(json!("0x10")))
        .expect(1)
        .mount(&up)
        .await;
    let untouched = server_answering(rpc_result(json!("0x20")), 0).await;

    let client = FallbackClient::build(
        [down.uri(), up.uri(), untouched.uri()],
        &RpcOptions::default(),
    )
    .unwrap();
    let block: String = client.call("eth_blockNumber", json!([])).await.unwrap();

    assert_eq!(block, "0x10");
}

#[tokio::test]
async fn json_rpc_errors_are_returned_without_failover() {
    let reverting = server_answering(
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 3, "message": "execution reverted", "data": "0x08c379a0"}
        })),
        1,
    )
    .await;
    let untouched = server_answering(rpc_result(json!("0x")), 0).await;

    let client =
        FallbackClient::build([reverting.uri(), untouched.uri()], &RpcOptions::default()).unwrap();
    let response = client.request("eth_call", json!([])).await.unwrap();

    let error = response.payload.unwrap_err();
    assert_eq!(error.code, 3);
    assert_eq!(error.data, Some(json!("0x08c379a0")));
}

#[tokio::test]
async fn slow_and_malformed_endpoints_are_skipped() {
    let slow = server_answering(
        rpc_result(json!("0x1")).set_delay(Duration::from_secs(2)),
        1,
    )
    .await;
    let garbage = server_answering(ResponseTemplate::new(200).set_body_string("<html>"), 1).await;
    let healthy = server_answering(rpc_result(json!("0x89")), 1).await;

    let options = RpcOptions {
        timeout: Duration::from_millis(200),
    };
    let client =
        FallbackClient::build([slow.uri(), garbage.uri(), healthy.uri()], &options).unwrap();
    let chain_id: String = client.call("eth_chainId", json!([])).await.unwrap();

    assert_eq!(chain_id, "0x89");
}

#[tokio::test]
async fn reports_all_failures_when_no_endpoint_answers() {
    let refused = refused_endpoint();
    let down = server_answering(ResponseTemplate::new(502), 1).await;

    let client = FallbackClient::build([refused.clone(), down.uri()], &RpcOptions::default()).unwrap();
    let err = client.request("eth_chainId", json!([])).await.unwrap_err();

    let RpcError::AllEndpointsFailed { failures } = err else {
        panic!("expected AllEndpointsFailed, got {err:?}");
    };
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].endpoint, refused);
    assert!(matches!(failures[0].error, TransportError::Connect(_)));
    assert_eq!(failures[1].error, TransportError::Status(502));
}

#[tokio::test]
async fn failure_reports_omit_url_paths() {
    let keyed = format!("{}/v2/SECRETKEY123", refused_endpoint());
    let client = FallbackClient::build([keyed.as_str()], &RpcOptions::default()).unwrap();

    let err = client.request("eth_chainId", json!([])).await.unwrap_err();
    let RpcError::AllEndpointsFailed { failures } = err else {
        panic!("expected AllEndpointsFailed, got {err:?}");
    };
    assert!(keyed.starts_with(&failures[0].endpoint));
    assert!(!failures[0].endpoint.contains("SECRETKEY123"));
    assert!(!failures[0].error.to_string().contains("SECRETKEY123"));
}

#[tokio::test]
async fn networks_read_client_uses_registry_endpoints() {
    let down = server_answering(ResponseTemplate::new(500), 1).await;
    let up = server_answering(rpc_result(json!("0x2a")), 1).await;
    let registry = ChainRegistry::new([ChainRecord::new(
        137,
        "Polygon",
        "MATIC",
        [down.uri(), up.uri()],
    )])
    .unwrap();
    let networks = Networks::new(registry, &RpcOptions::default()).unwrap();

    let client = networks.get_read_client(ChainId(137)).unwrap();
    let block: String = client.call("eth_blockNumber", json!([])).await.unwrap();

    assert_eq!(block, "0x2a");
}
