//! Integration tests for the HTTP Gateway client against a mock server
//!
//! These tests validate:
//! - Request/response mapping for each Gateway endpoint
//! - The duplicate flag surfacing from submission
//! - Error classification for non-2xx and malformed responses
//! - Tolerance for absent optional receipt fields

use rust_decimal::Decimal;

use radix_agent::error::AgentError;
use radix_agent::gateway::{GatewayClient, HttpGatewayClient};
use radix_agent::types::{TransactionId, TransactionStatus};

fn tx_id() -> TransactionId {
    TransactionId("txid_9f2c41aa".to_string())
}

#[tokio::test]
async fn test_current_epoch_reads_ledger_state() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/transaction/construction")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ledger_state": {"epoch": 81722}}"#)
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    assert_eq!(client.current_epoch().await.unwrap(), 81722);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_submit_reports_duplicate_flag() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/submit")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "notarized_transaction_hex": "4d0102"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"duplicate": true}"#)
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let result = client.submit_transaction("4d0102").await.unwrap();
    assert!(result.duplicate);
}

#[tokio::test]
async fn test_submit_failure_is_a_submission_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/submit")
        .with_status(500)
        .with_body("mempool full")
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let err = client.submit_transaction("4d0102").await.unwrap_err();
    // Submission failures stay distinct from plain Gateway query failures,
    // and they remain retryable
    assert!(matches!(err, AgentError::Submission(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_status_maps_known_and_unknown_states() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"intent_status": "CommittedSuccess"}"#)
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    assert_eq!(
        client.transaction_status(&tx_id()).await.unwrap(),
        TransactionStatus::CommittedSuccess
    );

    // An intermediate state this client does not model keeps polling alive
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"intent_status": "CommitPendingOutcomeUnknown"}"#)
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    assert_eq!(
        client.transaction_status(&tx_id()).await.unwrap(),
        TransactionStatus::Unknown
    );
}

#[tokio::test]
async fn test_committed_details_extracts_new_entities() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/committed-details")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "transaction": {
                    "receipt": {
                        "new_global_entities": [
                            {
                                "entity_address": "resource_rdx1tbrandnew000",
                                "entity_type": "GlobalFungibleResource"
                            },
                            {
                                "entity_address": "component_rdx1czside000",
                                "entity_type": "GlobalGenericComponent"
                            }
                        ]
                    }
                }
            }"#,
        )
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let receipt = client.transaction_details(&tx_id()).await.unwrap();
    assert_eq!(receipt.new_global_entities.len(), 2);
    assert_eq!(
        receipt.new_global_entities[0].entity_type,
        "GlobalFungibleResource"
    );
}

#[tokio::test]
async fn test_committed_details_tolerates_missing_receipt() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/committed-details")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"transaction": {}}"#)
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let receipt = client.transaction_details(&tx_id()).await.unwrap();
    assert!(receipt.new_global_entities.is_empty());
}

#[tokio::test]
async fn test_account_balances_parse_decimal_strings() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/state/entity/page/fungibles")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "items": [
                    {
                        "resource_address": "resource_rdx1tknxrd",
                        "amount": "1234.567890123456789",
                        "metadata": {"symbol": "XRD"}
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let balances = client.account_balances("account_rdx1qqq").await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(
        balances[0].amount,
        "1234.567890123456789".parse::<Decimal>().unwrap()
    );
    assert_eq!(balances[0].metadata.get("symbol").map(String::as_str), Some("XRD"));
}

#[tokio::test]
async fn test_malformed_body_is_a_gateway_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transaction/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json")
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let err = client.transaction_status(&tx_id()).await.unwrap_err();
    assert!(matches!(err, AgentError::Gateway(_)));
}

#[tokio::test]
async fn test_entity_details_requires_one_item() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/state/entity/details")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let client = HttpGatewayClient::new(server.url()).unwrap();
    let err = client.entity_details("component_rdx1czq").await.unwrap_err();
    assert!(matches!(err, AgentError::Gateway(_)));
}
