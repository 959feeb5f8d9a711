// tests/api_order_tests.rs
mod common;

use actix_web::test::TestRequest;
use backstore::{NoticeKind, OrderStatus};
use common::*;
use serde_json::json;
use uuid::Uuid;

#[actix_web::test]
async fn test_status_update_returns_history_and_notifies_once() {
  let h = Harness::new();
  let token = h.token();
  let order = h.seed_order(OrderStatus::Paid);

  let (status, body) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/status", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "status": "shipped" })),
  )
  .await;

  assert_eq!(status, 200);
  assert_eq!(body["data"]["status"], "shipped");
  assert_eq!(body["data"]["notes"], "Order status updated to shipped");
  assert_eq!(body["data"]["changed_by"], h.admin.id.to_string());
  assert_eq!(h.notifier.count(NoticeKind::Shipment), 1);

  let stored = h.orders.get(order.id).unwrap();
  assert_eq!(stored.status, OrderStatus::Shipped);
  assert!(stored.is_shipped);
  assert_eq!(h.orders.history_for(order.id).len(), 1);
}

#[actix_web::test]
async fn test_invalid_status_is_400_without_writes() {
  let h = Harness::new();
  let token = h.token();
  let order = h.seed_order(OrderStatus::Paid);

  let (status, body) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/status", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "status": "invalid_status" })),
  )
  .await;
  assert_eq!(status, 400);
  assert_eq!(body["error"]["code"], "BAD_REQUEST");

  let (status, _) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/status", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "notes": "no status given" })),
  )
  .await;
  assert_eq!(status, 400);

  assert_eq!(h.orders.write_count(), 0);
  assert_eq!(h.notifier.count(NoticeKind::Shipment), 0);
}

#[actix_web::test]
async fn test_status_update_for_unknown_order_is_404() {
  let h = Harness::new();
  let token = h.token();

  let (status, body) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/status", Uuid::new_v4()))
      .insert_header(bearer(&token))
      .set_json(json!({ "status": "paid" })),
  )
  .await;
  assert_eq!(status, 404);
  assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_malformed_order_id_is_400() {
  let h = Harness::new();
  let token = h.token();
  let (status, body) = send(
    &h.state,
    TestRequest::get()
      .uri("/api/v1/orders/not-a-uuid")
      .insert_header(bearer(&token)),
  )
  .await;
  assert_eq!(status, 400);
  assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_patch_applies_allow_listed_fields_only() {
  let h = Harness::new();
  let token = h.token();
  let order = h.seed_order(OrderStatus::Paid);

  let (status, body) = send(
    &h.state,
    TestRequest::patch()
      .uri(&format!("/api/v1/orders/{}", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "order_number": "HACKED" })),
  )
  .await;
  assert_eq!(status, 400, "{}", body);
  assert_eq!(h.orders.get(order.id).unwrap().order_number, "ORD-2001");

  let (status, body) = send(
    &h.state,
    TestRequest::patch()
      .uri(&format!("/api/v1/orders/{}", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "discount": 20, "admin_notes": "Loyalty credit" })),
  )
  .await;
  assert_eq!(status, 200);
  assert_eq!(body["data"]["total_amount"].as_f64(), Some(300.0));
  assert_eq!(body["data"]["admin_notes"], "Loyalty credit");
  assert_eq!(body["data"]["status"], "paid");
  assert!(h.orders.history_for(order.id).is_empty());
}

#[actix_web::test]
async fn test_patch_marking_delivered_sends_delivery_notice() {
  let h = Harness::new();
  let token = h.token();
  let order = h.seed_order(OrderStatus::Shipped);

  let (status, _) = send(
    &h.state,
    TestRequest::patch()
      .uri(&format!("/api/v1/orders/{}", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "is_delivered": true })),
  )
  .await;
  assert_eq!(status, 200);
  assert_eq!(h.notifier.count(NoticeKind::Delivery), 1);
}

#[actix_web::test]
async fn test_patch_status_is_stored_without_history_or_notice() {
  let h = Harness::new();
  let token = h.token();
  let order = h.seed_order(OrderStatus::Paid);

  let (status, body) = send(
    &h.state,
    TestRequest::patch()
      .uri(&format!("/api/v1/orders/{}", order.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "status": "shipped" })),
  )
  .await;
  assert_eq!(status, 200, "{}", body);
  assert_eq!(body["data"]["status"], "shipped");
  assert_eq!(h.orders.get(order.id).unwrap().status, OrderStatus::Shipped);
  assert!(h.orders.history_for(order.id).is_empty());
  assert_eq!(h.notifier.count(NoticeKind::Shipment), 0);
}

#[actix_web::test]
async fn test_order_detail_includes_items_and_history() {
  let h = Harness::new();
  let token = h.token();
  let order = h.seed_order(OrderStatus::Pending);

  for next in ["paid", "shipped"] {
    let (status, _) = send(
      &h.state,
      TestRequest::put()
        .uri(&format!("/api/v1/orders/{}/status", order.id))
        .insert_header(bearer(&token))
        .set_json(json!({ "status": next })),
    )
    .await;
    assert_eq!(status, 200);
  }

  let (status, body) = send(
    &h.state,
    TestRequest::get()
      .uri(&format!("/api/v1/orders/{}", order.id))
      .insert_header(bearer(&token)),
  )
  .await;
  assert_eq!(status, 200);
  assert_eq!(body["data"]["order_number"], "ORD-2001");
  assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
  let history = body["data"]["history"].as_array().unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0]["status"], "paid");
  assert_eq!(history[1]["status"], "shipped");

  let (status, body) = send(
    &h.state,
    TestRequest::get()
      .uri(&format!("/api/v1/orders/{}/history", order.id))
      .insert_header(bearer(&token)),
  )
  .await;
  assert_eq!(status, 200);
  assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_list_orders_filters_by_status() {
  let h = Harness::new();
  let token = h.token();
  h.seed_order(OrderStatus::Paid);
  h.seed_order(OrderStatus::Pending);
  h.seed_order(OrderStatus::Pending);

  let (status, body) = send(
    &h.state,
    TestRequest::get()
      .uri("/api/v1/orders?status=pending")
      .insert_header(bearer(&token)),
  )
  .await;
  assert_eq!(status, 200);
  let orders = body["data"].as_array().unwrap();
  assert_eq!(orders.len(), 2);
  assert!(orders.iter().all(|o| o["status"] == "pending"));

  let (status, _) = send(
    &h.state,
    TestRequest::get()
      .uri("/api/v1/orders?status=lost")
      .insert_header(bearer(&token)),
  )
  .await;
  assert_eq!(status, 400);
}
