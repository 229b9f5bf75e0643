//! End-to-end tests for order ingestion:
//! POST /api/orders → order queue → order worker → store.

use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use queue::queues;
use serde_json::json;

async fn seed_customers(ctx: &TestContext, server: &TestServer, ids: &[&str]) {
    let payload: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| fixtures::customer(id, &format!("Name {id}")))
        .collect();
    server
        .post("/api/customers")
        .json(&json!(payload))
        .await
        .assert_status_ok();
    ctx.wait_for_jobs(queues::CUSTOMER, 1).await;
}

#[tokio::test]
async fn test_order_for_unknown_customer_is_skipped_not_fatal() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    seed_customers(&ctx, &server, &["u1"]).await;

    let response = server
        .post("/api/orders")
        .json(&json!([
            fixtures::order("o1", "u1"),
            fixtures::order("o2", "u2"),
        ]))
        .await;
    response.assert_status_ok();

    ctx.wait_for_jobs(queues::ORDER, 1).await;

    // The valid order commits, the invalid one is dropped, the job succeeds.
    assert_eq!(ctx.store.orders_for_customer("u1").len(), 1);
    assert_eq!(ctx.store.orders_for_customer("u2").len(), 0);
    assert_eq!(ctx.store.items_for_order("o1").len(), 1);
    assert_eq!(ctx.store.items_for_order("o2").len(), 0);

    let stats = ctx.broker.queue(queues::ORDER).stats();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_resubmitted_order_batch_is_idempotent() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    seed_customers(&ctx, &server, &["u1"]).await;

    let payload = json!([fixtures::order("o1", "u1")]);
    server.post("/api/orders").json(&payload).await.assert_status_ok();
    server.post("/api/orders").json(&payload).await.assert_status_ok();

    ctx.wait_for_jobs(queues::ORDER, 2).await;

    assert_eq!(ctx.store.order_count(), 1);
    assert_eq!(ctx.store.item_count(), 1);
}

#[tokio::test]
async fn test_invalid_order_fields_are_rejected_with_details() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/orders")
        .json(&json!([fixtures::invalid_order("o1", "u1")]))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid order data provided.");
    assert!(body["details"]["0"].is_object(), "per-index field errors");

    assert_eq!(ctx.broker.queue(queues::ORDER).stats().enqueued, 0);
}

#[tokio::test]
async fn test_empty_order_submission_is_accepted() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/api/orders").json(&json!([])).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Successfully queued 0 orders in 0 batches");
}
