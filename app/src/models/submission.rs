// app/src/models/submission.rs

use serde::Deserialize;

/// Order as sent by the storefront or the dashboard. Prices are never taken
/// from here; items only name products and quantities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
  #[serde(default)]
  pub customer_name: String,
  #[serde(default)]
  pub customer_address: String,
  #[serde(default)]
  pub customer_phone: String,
  #[serde(default)]
  pub customer_email: String,
  /// `YYYY-MM-DD`; parsed during validation so a bad value becomes a message.
  #[serde(default)]
  pub delivery_date: String,
  #[serde(default)]
  pub meal_type: String,
  #[serde(default)]
  pub payment_method: String,
  #[serde(default)]
  pub serving_styles: Vec<String>,
  #[serde(default)]
  pub remarks: String,
  #[serde(default)]
  pub is_care_user: bool,
  #[serde(default)]
  pub items: Vec<ItemSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSelection {
  pub product_id: String,
  pub quantity: i64,
}
