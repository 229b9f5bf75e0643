//! End-to-end tests for campaign delivery:
//! POST /api/campaigns → campaign queue → campaign worker → store,
//! plus the delivery-receipt callback.

use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use queue::queues;
use serde_json::json;
use worker::{vendor_message_id, DeliveryOutcome};

async fn seed_customers(ctx: &TestContext, server: &TestServer, records: Vec<serde_json::Value>) {
    server
        .post("/api/customers")
        .json(&json!(records))
        .await
        .assert_status_ok();
    ctx.wait_for_jobs(queues::CUSTOMER, 1).await;
}

async fn create_campaign(server: &TestServer, message: &str, audience: &[&str]) -> String {
    let response = server
        .post("/api/campaigns")
        .json(&fixtures::campaign_request(message, audience))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    body["data"]["campaign"]["id"]
        .as_str()
        .expect("campaign id")
        .to_string()
}

#[tokio::test]
async fn test_campaign_end_to_end() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    seed_customers(
        &ctx,
        &server,
        vec![
            fixtures::customer("u1", "A"),
            fixtures::customer("u2", "B"),
            fixtures::customer("u3", "C"),
        ],
    )
    .await;

    // Deterministic outcomes, in audience order.
    ctx.channel.push_outcomes([
        DeliveryOutcome::Sent,
        DeliveryOutcome::Failed,
        DeliveryOutcome::Sent,
    ]);

    let campaign_id = create_campaign(&server, "Hi {{name}}", &["u1", "u2", "u3"]).await;
    ctx.wait_for_jobs(queues::CAMPAIGN, 1).await;

    // Campaign completed with the invariant intact.
    let listing: serde_json::Value = server.get("/api/campaigns").await.json();
    let campaign = &listing["data"][0];
    assert_eq!(campaign["id"], campaign_id.as_str());
    assert_eq!(campaign["status"], "COMPLETED");
    assert_eq!(campaign["audienceSize"], 3);
    assert_eq!(campaign["sentCount"], 2);
    assert_eq!(campaign["failedCount"], 1);
    assert_eq!(campaign["segmentName"], "High spenders");

    // One log per recipient, personalized.
    let logs_response = server
        .get(&format!("/api/campaigns/{campaign_id}/logs"))
        .await;
    logs_response.assert_status_ok();
    let logs: serde_json::Value = logs_response.json();
    let rows = logs["data"].as_array().expect("log rows");
    assert_eq!(rows.len(), 3);

    let u1_log = rows
        .iter()
        .find(|row| row["customerId"] == "u1")
        .expect("log for u1");
    assert_eq!(u1_log["personalizedMessage"], "Hi A");
    assert_eq!(u1_log["status"], "SENT");
    assert_eq!(
        u1_log["vendorMessageId"],
        vendor_message_id(&campaign_id, "u1").as_str()
    );

    let u2_log = rows
        .iter()
        .find(|row| row["customerId"] == "u2")
        .expect("log for u2");
    assert_eq!(u2_log["status"], "FAILED");

    assert_eq!(ctx.channel.delivery_count(), 3);
}

#[tokio::test]
async fn test_empty_audience_completes_without_sending() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let campaign_id = create_campaign(&server, "Hi {{name}}", &[]).await;
    ctx.wait_for_jobs(queues::CAMPAIGN, 1).await;

    let listing: serde_json::Value = server.get("/api/campaigns").await.json();
    let campaign = &listing["data"][0];
    assert_eq!(campaign["status"], "COMPLETED");
    assert_eq!(campaign["sentCount"], 0);
    assert_eq!(campaign["failedCount"], 0);

    let logs: serde_json::Value = server
        .get(&format!("/api/campaigns/{campaign_id}/logs"))
        .await
        .json();
    assert_eq!(logs["data"].as_array().unwrap().len(), 0);
    assert_eq!(ctx.channel.delivery_count(), 0);
}

#[tokio::test]
async fn test_delivery_receipt_updates_matching_log_only() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    seed_customers(&ctx, &server, vec![fixtures::customer("u1", "A")]).await;
    let campaign_id = create_campaign(&server, "Hi {{name}}", &["u1"]).await;
    ctx.wait_for_jobs(queues::CAMPAIGN, 1).await;

    // Wrong vendor message id: nothing matches.
    let response = server
        .post("/api/communication/receipt")
        .json(&json!({
            "campaignId": campaign_id,
            "customerId": "u1",
            "vendorMessageId": "msg_other",
            "status": "DELIVERED"
        }))
        .await;
    response.assert_status_not_found();

    // Matching triple updates the receipt status in place.
    let response = server
        .post("/api/communication/receipt")
        .json(&json!({
            "campaignId": campaign_id,
            "customerId": "u1",
            "vendorMessageId": vendor_message_id(&campaign_id, "u1"),
            "status": "DELIVERED"
        }))
        .await;
    response.assert_status_ok();

    let logs: serde_json::Value = server
        .get(&format!("/api/campaigns/{campaign_id}/logs"))
        .await
        .json();
    assert_eq!(logs["data"][0]["deliveryReceiptStatus"], "DELIVERED");

    // Campaign aggregates are untouched by receipts.
    let listing: serde_json::Value = server.get("/api/campaigns").await.json();
    assert_eq!(listing["data"][0]["sentCount"], 1);
}

#[tokio::test]
async fn test_receipt_with_missing_fields_is_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/communication/receipt")
        .json(&json!({ "campaignId": "c1" }))
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Missing required fields.");
    drop(ctx);
}

#[tokio::test]
async fn test_logs_for_unknown_campaign_is_404() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/api/campaigns/ghost/logs").await;
    response.assert_status_not_found();
    drop(ctx);
}

#[tokio::test]
async fn test_campaign_validation_rejects_short_message() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/campaigns")
        .json(&fixtures::campaign_request("Hi", &["u1"]))
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["details"].is_object() || body["details"].is_array());

    assert_eq!(ctx.broker.queue(queues::CAMPAIGN).stats().enqueued, 0);
}
