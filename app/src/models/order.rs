// app/src/models/order.rs

use super::order_item::OrderItem;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
  #[default]
  #[serde(rename = "未対応")]
  Pending,
  #[serde(rename = "対応済")]
  Done,
  #[serde(rename = "キャンセル")]
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "未対応",
      OrderStatus::Done => "対応済",
      OrderStatus::Cancelled => "キャンセル",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "未対応" | "pending" => Ok(OrderStatus::Pending),
      "対応済" | "done" => Ok(OrderStatus::Done),
      "キャンセル" | "cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(format!("unknown order status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  /// Issued once by the sequencer after the order is stored.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_number: Option<i64>,
  #[serde(default)]
  pub status: OrderStatus,
  pub items: Vec<OrderItem>,
  pub total_price: i64,

  pub customer_name: String,
  pub customer_address: String,
  pub customer_phone: String,
  pub customer_email: String,

  pub delivery_date: NaiveDate,
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

  pub order_date: DateTime<Utc>,
  /// Only ever goes from false to true.
  #[serde(default)]
  pub completion_email_sent: bool,
}
