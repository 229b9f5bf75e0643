//! Test fixtures and payload builders.

use serde_json::{json, Value};
use uuid::Uuid;

/// A customer record with a fixed id.
pub fn customer(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "phone": "555-0100",
    })
}

/// A customer record with a nested address.
pub fn customer_with_address(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "phone": "555-0100",
        "address": {
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zipCode": "62704",
            "country": "US"
        }
    })
}

/// N customer records with generated ids.
pub fn customers(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            let id = Uuid::new_v4().to_string();
            customer(&id, &format!("Customer {i}"))
        })
        .collect()
}

/// An order with one line item, priced in minor units.
pub fn order(order_id: &str, customer_id: &str) -> Value {
    json!({
        "id": order_id,
        "customerId": customer_id,
        "items": [{
            "id": format!("{order_id}-i1"),
            "productId": "p1",
            "name": "Beef Taco",
            "price": 100,
            "quantity": 2,
            "total": 200
        }],
        "totalAmount": 200,
        "currency": "USD",
        "status": "PLACED"
    })
}

/// An order that fails field validation (non-positive item price).
pub fn invalid_order(order_id: &str, customer_id: &str) -> Value {
    json!({
        "id": order_id,
        "customerId": customer_id,
        "items": [{
            "productId": "p1",
            "name": "Beef Taco",
            "price": 0,
            "quantity": 1,
            "total": 100
        }],
        "totalAmount": 100,
        "currency": "USD",
        "status": "PLACED"
    })
}

/// A campaign + segment creation request over an explicit audience.
pub fn campaign_request(message: &str, audience: &[&str]) -> Value {
    json!({
        "campaignName": "Taco Tuesday promo",
        "message": message,
        "segmentName": "High spenders",
        "segmentRules": {
            "operator": "AND",
            "rules": [{ "field": "totalSpend", "op": ">", "value": 10000 }]
        },
        "audienceUserIds": audience,
    })
}
