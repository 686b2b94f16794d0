// tests/public_data_tests.rs

mod common;

use bento_orders::errors::{AppError, ErrorCode};
use bento_orders::models::DEFAULT_DELIVERY_AREA_TEXT;
use bento_orders::pipelines::public_data::get_public_data;
use bento_orders::store::{DocumentStore, PAYMENT_METHODS, PRODUCTS, SERVING_STYLES, SETTINGS, STORE_INFO_ID};
use common::{harness, seed_product};
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn only_visible_products_are_published() {
  let h = harness();
  seed_product(h.store.as_ref(), json!({ "name": "Bento A", "price": 500, "isVisible": true })).await;
  seed_product(h.store.as_ref(), json!({ "name": "Secret Bento", "price": 900, "isVisible": false })).await;
  seed_product(h.store.as_ref(), json!({ "name": "Draft Bento", "price": 700 })).await;

  let data = get_public_data(&h.state).await.unwrap();
  let names: Vec<_> = data.products.iter().map(|p| p.data.name.as_str()).collect();
  assert_eq!(names, vec!["Bento A"]);
}

#[tokio::test]
#[serial]
async fn discount_price_is_always_filled_in() {
  let h = harness();
  seed_product(
    h.store.as_ref(),
    json!({ "name": "Bento A", "price": 500, "discountPrice": 450, "isVisible": true }),
  )
  .await;
  seed_product(h.store.as_ref(), json!({ "name": "Bento B", "price": 300, "isVisible": true })).await;
  seed_product(
    h.store.as_ref(),
    json!({ "name": "Bento C", "price": 800, "discountPrice": "free", "isVisible": true }),
  )
  .await;

  let data = get_public_data(&h.state).await.unwrap();
  let prices: Vec<_> = data
    .products
    .iter()
    .map(|p| (p.data.name.as_str(), p.data.discount_price))
    .collect();
  assert_eq!(
    prices,
    vec![("Bento A", Some(450)), ("Bento B", Some(300)), ("Bento C", Some(800))]
  );
}

#[tokio::test]
#[serial]
async fn options_and_store_info_are_included() {
  let h = harness();
  h.store.insert(SERVING_STYLES, json!({ "name": "刻み" })).await.unwrap();
  h.store.insert(SERVING_STYLES, json!({ "name": "おかゆ" })).await.unwrap();
  h.store.insert(PAYMENT_METHODS, json!({ "name": "現金" })).await.unwrap();
  h.store
    .set(SETTINGS, STORE_INFO_ID, json!({ "deliveryAreaText": "市内全域" }), false)
    .await
    .unwrap();

  let data = get_public_data(&h.state).await.unwrap();
  assert_eq!(data.serving_styles.len(), 2);
  assert_eq!(data.payment_methods[0].data.name, "現金");
  assert_eq!(data.store_info.delivery_area_text(), "市内全域");

  let body = serde_json::to_value(&data).unwrap();
  assert!(body.get("servingStyles").is_some());
  assert!(body.get("paymentMethods").is_some());
  assert_eq!(body["storeInfo"]["deliveryAreaText"], "市内全域");
}

#[tokio::test]
#[serial]
async fn empty_database_yields_empty_lists_and_default_store_text() {
  let h = harness();
  let data = get_public_data(&h.state).await.unwrap();
  assert!(data.products.is_empty());
  assert!(data.serving_styles.is_empty());
  assert!(data.payment_methods.is_empty());
  assert_eq!(data.store_info.delivery_area_text(), DEFAULT_DELIVERY_AREA_TEXT);
}

#[tokio::test]
#[serial]
async fn one_failed_read_fails_the_whole_call() {
  let h = harness();
  seed_product(h.store.as_ref(), json!({ "name": "Bento A", "price": 500, "isVisible": true })).await;
  h.store.fail_list.lock().insert(PAYMENT_METHODS.to_string());

  let err = get_public_data(&h.state).await.unwrap_err();
  assert_eq!(err.code(), ErrorCode::Internal);
  match err {
    AppError::Internal(message) => assert_eq!(message, "Unable to fetch public data."),
    other => panic!("unexpected error: {:?}", other),
  }

  h.store.fail_list.lock().clear();
  h.store.fail_list.lock().insert(PRODUCTS.to_string());
  assert!(get_public_data(&h.state).await.is_err());
}
