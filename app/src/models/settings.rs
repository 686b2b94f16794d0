// app/src/models/settings.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_DELIVERY_AREA_TEXT: &str = "配達エリア情報は店舗にご確認ください。";

/// `settings/emailTemplates`. Empty strings are treated the same as missing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplates {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub from_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub admin_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_confirm_subject: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_confirm_body: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub admin_notify_subject: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub admin_notify_body: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub process_complete_subject: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub process_complete_body: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl EmailTemplates {
  pub fn sender(&self) -> Option<&str> {
    non_empty(&self.from_email)
  }

  pub fn admin_recipient(&self) -> Option<&str> {
    non_empty(&self.admin_email)
  }

  pub fn order_confirm(&self) -> (Option<&str>, Option<&str>) {
    (non_empty(&self.order_confirm_subject), non_empty(&self.order_confirm_body))
  }

  pub fn admin_notify(&self) -> (Option<&str>, Option<&str>) {
    (non_empty(&self.admin_notify_subject), non_empty(&self.admin_notify_body))
  }

  pub fn process_complete(&self) -> (Option<&str>, Option<&str>) {
    (non_empty(&self.process_complete_subject), non_empty(&self.process_complete_body))
  }
}

/// `settings/storeInfo`: store-facing text shown on the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub delivery_area_text: Option<String>,
}

impl StoreInfo {
  pub fn delivery_area_text(&self) -> &str {
    non_empty(&self.delivery_area_text).unwrap_or(DEFAULT_DELIVERY_AREA_TEXT)
  }
}
