//! End-to-end tests for customer ingestion:
//! POST /api/customers → customer queue → customer worker → store.

use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use queue::queues;
use serde_json::json;
use store::Store;

#[tokio::test]
async fn test_ingest_single_customer() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/customers")
        .json(&json!([fixtures::customer("u1", "A")]))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Successfully queued 1 customers in 1 batches"
    );

    ctx.wait_for_jobs(queues::CUSTOMER, 1).await;

    assert_eq!(ctx.store.customer_count(), 1);
    let customer = ctx.store.customer("u1").await.unwrap().expect("row for u1");
    assert_eq!(customer.name, "A");
    assert_eq!(customer.email, "u1@example.com");
}

#[tokio::test]
async fn test_large_submission_is_chunked() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/customers")
        .json(&json!(fixtures::customers(250)))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["message"],
        "Successfully queued 250 customers in 3 batches"
    );

    ctx.wait_for_jobs(queues::CUSTOMER, 3).await;
    assert_eq!(ctx.store.customer_count(), 250);
}

#[tokio::test]
async fn test_resubmitted_batch_is_idempotent() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let payload = json!([fixtures::customer("u1", "A"), fixtures::customer("u2", "B")]);

    server.post("/api/customers").json(&payload).await.assert_status_ok();
    server.post("/api/customers").json(&payload).await.assert_status_ok();

    ctx.wait_for_jobs(queues::CUSTOMER, 2).await;

    assert_eq!(ctx.store.customer_count(), 2, "no duplicate rows");
    let stats = ctx.broker.queue(queues::CUSTOMER).stats();
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_address_rows_are_created_with_their_customer() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server
        .post("/api/customers")
        .json(&json!([fixtures::customer_with_address("u1", "A")]))
        .await
        .assert_status_ok();

    ctx.wait_for_jobs(queues::CUSTOMER, 1).await;

    let address = ctx.store.address_for_customer("u1").expect("address row");
    assert_eq!(address.street, "1 Main St");
    assert_eq!(address.zip_code, "62704");
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/customers")
        .json(&json!({"not": "an array"}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(ctx.store.customer_count(), 0);
}
