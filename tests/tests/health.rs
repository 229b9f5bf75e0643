//! Health endpoints and shutdown behavior.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use queue::queues;
use serde_json::json;

#[tokio::test]
async fn test_health_reports_components_and_queues() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["queue_healthy"], true);
    assert_eq!(body["store_healthy"], true);

    let queue_names: Vec<&str> = body["queues"]
        .as_array()
        .expect("queue stats")
        .iter()
        .filter_map(|q| q["name"].as_str())
        .collect();
    for name in queues::ALL {
        assert!(queue_names.contains(name), "missing stats for {name}");
    }
}

#[tokio::test]
async fn test_probes_respond() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/live").await.assert_status_ok();
    server.get("/health/ready").await.assert_status_ok();
    drop(ctx);
}

#[tokio::test]
async fn test_shutdown_stops_workers_and_rejects_submissions() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server
        .post("/api/customers")
        .json(&json!([fixtures::customer("u1", "A")]))
        .await
        .assert_status_ok();
    ctx.wait_for_jobs(queues::CUSTOMER, 1).await;

    let broker = ctx.broker.clone();
    ctx.shutdown().await;

    // Closed queues surface as 503 at the submission boundary.
    let response = server
        .post("/api/customers")
        .json(&json!([fixtures::customer("u2", "B")]))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    assert!(broker.queue(queues::CUSTOMER).is_closed());
}
