// tests/api_coupon_tests.rs
mod common;

use actix_web::test::TestRequest;
use backstore::CouponType;
use common::*;
use serde_json::json;

#[actix_web::test]
async fn test_validate_coupon_is_public_and_prices_the_discount() {
  let h = Harness::new();
  h.coupons.insert_coupon(welcome20());

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons/validate")
      .set_json(json!({ "code": "welcome20", "order_amount": 1000 })),
  )
  .await;

  assert_eq!(status, 200);
  assert_eq!(body["success"], true);
  assert_eq!(body["data"]["valid"], true);
  assert_eq!(body["data"]["discount_amount"].as_f64(), Some(200.0));
  assert_eq!(body["data"]["final_amount"].as_f64(), Some(800.0));
  assert_eq!(body["data"]["coupon"]["code"], "WELCOME20");
  assert_eq!(body["data"]["coupon"]["type"], "percentage");
}

#[actix_web::test]
async fn test_validate_below_minimum_is_ok_but_invalid() {
  let h = Harness::new();
  let mut save100 = coupon("SAVE100", CouponType::FixedAmount, "100");
  save100.min_order_amount = Some(dec("1000"));
  h.coupons.insert_coupon(save100);

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons/validate")
      .set_json(json!({ "code": "SAVE100", "order_amount": 999 })),
  )
  .await;

  assert_eq!(status, 200);
  assert_eq!(body["data"]["valid"], false);
  assert_eq!(body["data"]["final_amount"].as_f64(), Some(999.0));
  assert!(body["data"]["message"].as_str().unwrap().contains("1000"));
  assert!(body["data"].get("coupon").is_none());
}

#[actix_web::test]
async fn test_validate_rejects_malformed_input() {
  let h = Harness::new();

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons/validate")
      .set_json(json!({ "code": "WELCOME20" })),
  )
  .await;
  assert_eq!(status, 400);
  assert_eq!(body["success"], false);
  assert_eq!(body["error"]["code"], "BAD_REQUEST");

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons/validate")
      .set_json(json!({ "code": "WELCOME20", "order_amount": -5 })),
  )
  .await;
  assert_eq!(status, 400);
  assert_eq!(body["error"]["code"], "BAD_REQUEST");
  assert_eq!(h.coupons.write_count(), 0);
}

#[actix_web::test]
async fn test_admin_coupon_routes_require_a_session() {
  let h = Harness::new();
  let (status, body) = send(&h.state, TestRequest::get().uri("/api/v1/coupons")).await;
  assert_eq!(status, 401);
  assert_eq!(body["error"]["code"], "UNAUTHORIZED");

  let (status, _) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons/redeem")
      .insert_header(bearer("not-a-real-token"))
      .set_json(json!({ "code": "WELCOME20" })),
  )
  .await;
  assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_create_coupon_normalizes_and_rejects_duplicates() {
  let h = Harness::new();
  let token = h.token();
  let payload = json!({
    "code": "spring-25",
    "name": "Spring sale",
    "type": "percentage",
    "value": 25,
    "valid_from": "2026-03-01T00:00:00Z",
    "valid_until": "2026-05-31T23:59:59Z"
  });

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons")
      .insert_header(bearer(&token))
      .set_json(payload.clone()),
  )
  .await;
  assert_eq!(status, 201);
  assert_eq!(body["data"]["code"], "SPRING-25");
  assert_eq!(body["data"]["used_count"], 0);
  assert!(h.coupons.get("spring-25").is_some());

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons")
      .insert_header(bearer(&token))
      .set_json(payload),
  )
  .await;
  assert_eq!(status, 409);
  assert_eq!(body["error"]["code"], "CONFLICT");
}

#[actix_web::test]
async fn test_create_coupon_validation() {
  let h = Harness::new();
  let token = h.token();

  let (status, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons")
      .insert_header(bearer(&token))
      .set_json(json!({
        "code": "TOOMUCH",
        "name": "Broken",
        "type": "percentage",
        "value": 120,
        "valid_from": "2026-03-01T00:00:00Z",
        "valid_until": "2026-05-31T23:59:59Z"
      })),
  )
  .await;
  assert_eq!(status, 400);
  assert!(body["error"]["message"].as_str().unwrap().contains("100"));
  assert_eq!(h.coupons.write_count(), 0);
}

#[actix_web::test]
async fn test_redeem_until_limit_then_conflict() {
  let h = Harness::new();
  let token = h.token();
  let mut once = coupon("ONCE", CouponType::FixedAmount, "10");
  once.usage_limit = Some(1);
  h.coupons.insert_coupon(once);

  let redeem = |code: &'static str| {
    TestRequest::post()
      .uri("/api/v1/coupons/redeem")
      .insert_header(bearer(&token))
      .set_json(json!({ "code": code }))
  };

  let (status, body) = send(&h.state, redeem("once")).await;
  assert_eq!(status, 200);
  assert_eq!(body["data"]["used_count"], 1);

  let (status, body) = send(&h.state, redeem("ONCE")).await;
  assert_eq!(status, 409);
  assert!(body["error"]["message"].as_str().unwrap().contains("usage limit"));

  let (status, body) = send(&h.state, redeem("GHOST")).await;
  assert_eq!(status, 404);
  assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_delete_coupon_only_deactivates() {
  let h = Harness::new();
  let token = h.token();
  let c = coupon("BYEBYE", CouponType::FixedAmount, "5");
  let id = c.id;
  h.coupons.insert_coupon(c);

  let (status, body) = send(
    &h.state,
    TestRequest::delete()
      .uri(&format!("/api/v1/coupons/{}", id))
      .insert_header(bearer(&token)),
  )
  .await;
  assert_eq!(status, 200);
  assert_eq!(body["data"]["is_active"], false);
  assert_eq!(h.coupons.get("BYEBYE").unwrap().is_active, false);

  let (_, body) = send(
    &h.state,
    TestRequest::post()
      .uri("/api/v1/coupons/validate")
      .set_json(json!({ "code": "BYEBYE", "order_amount": 50 })),
  )
  .await;
  assert_eq!(body["data"]["valid"], false);
}

#[actix_web::test]
async fn test_update_coupon_checks_merged_rules() {
  let h = Harness::new();
  let token = h.token();
  let c = coupon("FLAT10", CouponType::FixedAmount, "10");
  let id = c.id;
  h.coupons.insert_coupon(c);

  // 150 is fine as a fixed amount but not once the type becomes percentage.
  let (status, _) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/coupons/{}", id))
      .insert_header(bearer(&token))
      .set_json(json!({ "type": "percentage", "value": 150 })),
  )
  .await;
  assert_eq!(status, 400);

  let (status, body) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/coupons/{}", id))
      .insert_header(bearer(&token))
      .set_json(json!({ "name": "Flat ten", "used_count": 0 })),
  )
  .await;
  assert_eq!(status, 400, "used_count is not editable: {}", body);

  let (status, body) = send(
    &h.state,
    TestRequest::put()
      .uri(&format!("/api/v1/coupons/{}", id))
      .insert_header(bearer(&token))
      .set_json(json!({ "name": "Flat ten" })),
  )
  .await;
  assert_eq!(status, 200);
  assert_eq!(body["data"]["name"], "Flat ten");
  assert_eq!(body["data"]["code"], "FLAT10");
}
