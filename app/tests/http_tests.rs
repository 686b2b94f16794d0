// tests/http_tests.rs

mod common;

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use bento_orders::models::{OrderItem, OrderStatus};
use bento_orders::web::configure_app_routes;
use bento_orders::web::extractors::APP_CHECK_HEADER;
use common::{
  harness, load_order, sample_order, seed_order, seed_product, seed_sender_and_admin, valid_delivery_date,
  ADMIN_TOKEN, APP_CHECK_TOKEN,
};
use serde_json::{json, Value};
use serial_test::serial;

fn bearer() -> (actix_web::http::header::HeaderName, String) {
  (AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
}

macro_rules! init_app {
  ($h:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($h.state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_web::test]
#[serial]
async fn health_reports_region() {
  let h = harness();
  let app = init_app!(h);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
  assert_eq!(body["region"], "asia-northeast1");
}

#[actix_web::test]
#[serial]
async fn public_data_requires_an_attested_app() {
  let h = harness();
  seed_product(h.store.as_ref(), json!({ "name": "Bento A", "price": 500, "isVisible": true })).await;
  let app = init_app!(h);

  let req = test::TestRequest::post()
    .uri("/getPublicData")
    .set_json(json!({ "data": null }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"]["status"], "FAILED_PRECONDITION");

  let req = test::TestRequest::post()
    .uri("/getPublicData")
    .insert_header((APP_CHECK_HEADER, APP_CHECK_TOKEN))
    .set_json(json!({ "data": null }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["result"]["products"][0]["name"], "Bento A");
  assert_eq!(body["result"]["products"][0]["discountPrice"], 500);
  assert!(body["result"]["storeInfo"].is_object());
}

#[actix_web::test]
#[serial]
async fn submit_order_returns_id_and_total_or_validation_details() {
  let h = harness();
  let product_id = seed_product(h.store.as_ref(), json!({ "name": "Bento A", "price": 500, "isVisible": true })).await;
  let app = init_app!(h);

  let req = test::TestRequest::post()
    .uri("/submitOrder")
    .insert_header((APP_CHECK_HEADER, APP_CHECK_TOKEN))
    .set_json(json!({ "data": { "customerEmail": "not-an-email", "items": [] } }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
  assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(2));

  let req = test::TestRequest::post()
    .uri("/submitOrder")
    .insert_header((APP_CHECK_HEADER, APP_CHECK_TOKEN))
    .set_json(json!({ "data": {
      "customerName": "山田 太郎",
      "customerAddress": "東京都千代田区1-1",
      "customerPhone": "090-1234-5678",
      "customerEmail": "taro@example.com",
      "deliveryDate": valid_delivery_date(&h.state.config),
      "items": [{ "productId": product_id, "quantity": 3 }],
    }}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["result"]["totalPrice"], 1500);
  assert!(body["result"]["orderId"].is_string());
}

#[actix_web::test]
#[serial]
async fn submit_order_without_payload_is_invalid() {
  let h = harness();
  let app = init_app!(h);

  let req = test::TestRequest::post()
    .uri("/submitOrder")
    .insert_header((APP_CHECK_HEADER, APP_CHECK_TOKEN))
    .set_json(json!({}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn admin_routes_reject_missing_or_wrong_tokens() {
  let h = harness();
  let app = init_app!(h);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/products").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/admin/products")
    .insert_header((AUTHORIZATION, "Bearer wrong-token"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post()
    .uri("/sendCompletionEmail")
    .set_json(json!({ "data": { "orderId": "anything" } }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"]["status"], "UNAUTHENTICATED");
}

#[actix_web::test]
#[serial]
async fn products_can_be_created_and_duplicated() {
  let h = harness();
  let app = init_app!(h);

  let req = test::TestRequest::post()
    .uri("/admin/products")
    .insert_header(bearer())
    .set_json(json!({ "name": "Bento A", "price": 500, "discountPrice": 450, "isVisible": true }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  let id = created["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri(&format!("/admin/products/{}/duplicate", id))
    .insert_header(bearer())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let copy: Value = test::read_body_json(resp).await;
  assert_eq!(copy["name"], "Bento A (コピー)");

  let copy_id = copy["id"].as_str().unwrap();
  let stored = bento_orders::store::get_typed::<bento_orders::models::Product>(
    h.store.as_ref(),
    bento_orders::store::PRODUCTS,
    copy_id,
  )
  .await
  .unwrap()
  .unwrap()
  .data;
  assert_eq!(stored.price, 500);
  assert_eq!(stored.discount_price, Some(450));
  assert!(!stored.is_visible);
}

#[actix_web::test]
#[serial]
async fn completion_email_follows_status_and_is_sent_once() {
  let h = harness();
  seed_sender_and_admin(h.store.as_ref()).await;
  let mut order = sample_order();
  order.order_number = Some(210);
  let order_id = seed_order(h.store.as_ref(), &order).await;
  let app = init_app!(h);

  let send = || {
    test::TestRequest::post()
      .uri("/sendCompletionEmail")
      .insert_header(bearer())
      .set_json(json!({ "data": { "orderId": order_id } }))
      .to_request()
  };

  let resp = test::call_service(&app, send()).await;
  assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

  let req = test::TestRequest::put()
    .uri(&format!("/admin/orders/{}/status", order_id))
    .insert_header(bearer())
    .set_json(json!({ "status": "対応済" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = test::call_service(&app, send()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["result"]["success"], true);

  let resp = test::call_service(&app, send()).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"]["status"], "ALREADY_EXISTS");

  assert_eq!(h.mailer.sent().len(), 1);
  let stored = load_order(h.store.as_ref(), &order_id).await;
  assert_eq!(stored.status, OrderStatus::Done);
  assert!(stored.completion_email_sent);
}

#[actix_web::test]
#[serial]
async fn editing_items_recomputes_total_and_keeps_the_number() {
  let h = harness();
  let mut order = sample_order();
  order.order_number = Some(220);
  let order_id = seed_order(h.store.as_ref(), &order).await;
  let app = init_app!(h);

  let items = vec![OrderItem {
    product_id: "p-a".to_string(),
    name: "Bento A".to_string(),
    quantity: 4,
    price: 500,
  }];
  let req = test::TestRequest::put()
    .uri(&format!("/admin/orders/{}", order_id))
    .insert_header(bearer())
    .set_json(json!({ "items": items, "remarks": "" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["totalPrice"], 2000);

  let stored = load_order(h.store.as_ref(), &order_id).await;
  assert_eq!(stored.total_price, 2000);
  assert_eq!(stored.order_number, Some(220));
  assert_eq!(stored.remarks, "");
  assert_eq!(stored.customer_name, "山田 太郎");
}
