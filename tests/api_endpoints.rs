//! Integration tests for the minichain REST API
//!
//! Each test drives a fresh node through the router and checks the JSON
//! shapes and statuses the endpoints promise.

use axum_test::TestServer;
use minichain::api::build_api_router;
use minichain::blockchain::Ledger;
use minichain::config::{MiningConfig, MiningMode};
use minichain::node::{Node, NodeIdentity};
use serde_json::{json, Value};

const GENESIS_TIMESTAMP: f64 = 1672531200.0;
const GENESIS_HASH: &str = "4faecf85cb9bbcb7ce8d365695284b3165bb7013de03cb54c1a82f3fba4e4229";

fn test_server(mode: MiningMode, difficulty: u32) -> TestServer {
    let mining = MiningConfig {
        mode,
        difficulty,
        ..MiningConfig::default()
    };
    let node = Node::with_ledger(
        Ledger::with_genesis_timestamp(GENESIS_TIMESTAMP),
        NodeIdentity::new("test-node"),
        mining,
    );
    TestServer::new(build_api_router(node)).expect("Failed to create test server")
}

#[tokio::test]
async fn test_read_endpoints_on_fresh_node() {
    let server = test_server(MiningMode::Server, 4);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["node_id"], "test-node");
    assert_eq!(json["mode"], "server");

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
    assert_eq!(json["chain"][0]["index"], 1);
    assert_eq!(json["chain"][0]["previous_hash"], "1");
    assert_eq!(json["chain"][0]["proof"], 100);

    let response = server.get("/last_block").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["last_block"]["index"], 1);
    assert!(json["last_block"]["transactions"].is_array());

    let response = server.get("/mining/context").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["index"], 2);
    assert_eq!(json["difficulty"], 4);
    assert_eq!(json["previous_hash"], GENESIS_HASH);
}

#[tokio::test]
async fn test_submit_transaction() {
    let server = test_server(MiningMode::Server, 4);

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "0", "recipient": "alice", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["index"], 2);
    assert_eq!(json["message"], "Transaction will be added to block 2");

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "0", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["message"].as_str().unwrap().starts_with("Missing values"));
}

#[tokio::test]
async fn test_server_side_mine_flow() {
    let server = test_server(MiningMode::Server, 4);

    server
        .post("/transactions/new")
        .json(&json!({"sender": "bob", "recipient": "alice", "amount": 3}))
        .await;

    let response = server.post("/mine").json(&json!({"id": "miner", "proof": 1})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["message"], "Failure. 1 is not a valid proof");

    let response = server.post("/mine").json(&json!({"id": "miner", "proof": 79321})).await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "New Block Forged");
    assert_eq!(json["block"]["index"], 2);
    assert_eq!(json["block"]["previous_hash"], GENESIS_HASH);
    let transactions = json["block"]["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[1]["sender"], "0");
    assert_eq!(transactions[1]["recipient"], "test-node");
    assert_eq!(transactions[1]["amount"], 1);

    let response = server.get("/wallet/alice").await;
    let json: Value = response.json();
    assert_eq!(json["balance"], 3.0);
    assert_eq!(json["incoming"].as_array().unwrap().len(), 1);
    assert_eq!(json["incoming"][0]["from"], "bob");

    let response = server.get("/wallet/test-node").await;
    let json: Value = response.json();
    assert_eq!(json["balance"], 1.0);
    assert_eq!(json["incoming"][0]["from"], "mined");
    assert_eq!(json["incoming"][0]["sender"], "0");
}

#[tokio::test]
async fn test_server_side_mine_without_proof_searches() {
    let server = test_server(MiningMode::Server, 2);

    let response = server.post("/mine").json(&json!({"id": "miner"})).await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["block"]["index"], 2);

    let response = server.get("/chain").await;
    let json: Value = response.json();
    assert_eq!(json["length"], 2);
}

#[tokio::test]
async fn test_client_side_mine_flow() {
    let server = test_server(MiningMode::Client, 4);

    let response = server.post("/mine").json(&json!({"proof": 36366})).await;
    assert_eq!(response.status_code(), 400);

    let response = server.post("/mine").json(&json!({"id": "miner"})).await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/mine")
        .json(&json!({"id": "miner", "proof": 36366, "previous_hash": "stale"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/mine")
        .json(&json!({"id": "miner", "proof": 36366, "previous_hash": GENESIS_HASH}))
        .await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["block"]["index"], 2);
    assert_eq!(json["block"]["proof"], 36366);
    assert!(json["block"]["transactions"].as_array().unwrap().is_empty());

    let response = server.get("/last_block").await;
    let json: Value = response.json();
    assert_eq!(json["last_block"]["index"], 2);
}

#[tokio::test]
async fn test_non_integer_proof_is_an_invalid_proof() {
    let server = test_server(MiningMode::Client, 4);

    for (proof, shown) in [(json!(-5), "-5"), (json!(1.5), "1.5"), (json!("abc"), "abc")] {
        let response = server
            .post("/mine")
            .json(&json!({"id": "miner", "proof": proof}))
            .await;
        assert_eq!(response.status_code(), 400);
        let json: Value = response.json();
        assert_eq!(json["message"], format!("Failure. {} is not a valid proof", shown));
    }

    let response = server.get("/chain").await;
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
}
