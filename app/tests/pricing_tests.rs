// tests/pricing_tests.rs

use bento_orders::models::{resolve_price, Product};
use serde_json::json;

fn product(discount: serde_json::Value) -> Product {
  serde_json::from_value(json!({
    "name": "Bento A",
    "price": 800,
    "discountPrice": discount,
    "isVisible": true
  }))
  .unwrap()
}

#[test]
fn care_user_gets_discount_price_when_set() {
  let p = product(json!(600));
  assert_eq!(resolve_price(&p, true), 600);
  assert_eq!(resolve_price(&p, false), 800);
}

#[test]
fn malformed_or_missing_discount_falls_back_to_standard_price() {
  for discount in [json!(null), json!("600"), json!(""), json!(12.5), json!({"v": 1})] {
    let p = product(discount.clone());
    assert_eq!(p.discount_price, None, "discount {:?} should read as absent", discount);
    assert_eq!(resolve_price(&p, true), 800);
    assert_eq!(resolve_price(&p, false), 800);
  }

  let without_field: Product = serde_json::from_value(json!({"name": "Bento B", "price": 500})).unwrap();
  assert_eq!(resolve_price(&without_field, true), 500);
  assert!(!without_field.is_visible);
}

#[test]
fn whole_float_discount_is_accepted() {
  let p = product(json!(600.0));
  assert_eq!(p.discount_price, Some(600));
}

#[test]
fn normalized_product_always_carries_a_discount_price() {
  let normalized = product(json!(null)).normalized();
  assert_eq!(normalized.discount_price, Some(800));
  assert_eq!(serde_json::to_value(&normalized).unwrap()["discountPrice"], json!(800));

  let kept = product(json!(650)).normalized();
  assert_eq!(kept.discount_price, Some(650));
}
