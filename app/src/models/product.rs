// app/src/models/product.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: i64,
  /// Care-insurance price. Anything other than a whole number reads as absent.
  #[serde(default, deserialize_with = "lenient_price", skip_serializing_if = "Option::is_none")]
  pub discount_price: Option<i64>,
  #[serde(default)]
  pub is_visible: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

impl Product {
  /// Fills in the discount price so clients never need the fallback rule themselves.
  pub fn normalized(mut self) -> Self {
    self.discount_price = Some(resolve_price(&self, true));
    self
  }
}

/// Unit price for a customer: the discount price for care-insurance users when
/// one is set, the standard price otherwise.
pub fn resolve_price(product: &Product, is_care_user: bool) -> i64 {
  match (is_care_user, product.discount_price) {
    (true, Some(discount)) => discount,
    _ => product.price,
  }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(match value {
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)),
    _ => None,
  })
}
