// app/src/models/order_item.rs

use serde::{Deserialize, Serialize};

/// A line of an order. `name` and `price` are copied from the product when
/// the order is priced and never looked up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub product_id: String,
  pub name: String,
  pub quantity: u32,
  pub price: i64,
}

impl OrderItem {
  /// `None` when `price x quantity` does not fit in an `i64`.
  pub fn subtotal(&self) -> Option<i64> {
    self.price.checked_mul(i64::from(self.quantity))
  }
}

/// Sum of the item subtotals, or `None` on overflow.
pub fn compute_total(items: &[OrderItem]) -> Option<i64> {
  items
    .iter()
    .try_fold(0i64, |total, item| item.subtotal().and_then(|s| total.checked_add(s)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(price: i64, quantity: u32) -> OrderItem {
    OrderItem {
      product_id: "p".to_string(),
      name: "Bento".to_string(),
      quantity,
      price,
    }
  }

  #[test]
  fn total_sums_subtotals() {
    assert_eq!(compute_total(&[item(500, 2), item(300, 1)]), Some(1300));
    assert_eq!(compute_total(&[]), Some(0));
  }

  #[test]
  fn overflow_is_reported_instead_of_wrapping() {
    assert_eq!(item(i64::MAX, 2).subtotal(), None);
    assert_eq!(compute_total(&[item(i64::MAX, 1), item(1, 1)]), None);
  }
}
