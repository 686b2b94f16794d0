// app/src/validation.rs

//! Checks applied to an order before anything is stored.

use crate::models::OrderSubmission;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Timelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
    .expect("Invalid email regex pattern")
});

// Mobile numbers (070/080/090/050) or landlines, hyphens removed.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(0[5789]0\d{8}|0\d{1,4}\d{1,4}\d{4})$").expect("Invalid phone regex pattern")
});

pub const MSG_REQUIRED: &str =
  "お名前、ご住所、電話番号、メールアドレス、配送希望日は必須です。また、商品は1つ以上選択してください。";
pub const MSG_EMAIL: &str = "有効なメールアドレスの形式ではありません。";
pub const MSG_PHONE: &str = "有効な日本の電話番号（市外局番、携帯番号）を入力してください。";
pub const MSG_DATE_FORMAT: &str = "配送希望日の形式が正しくありません。";
pub const MSG_QUANTITY: &str = "商品の数量は1以上で指定してください。";
pub const MSG_QUANTITY_TOO_LARGE: &str = "商品の数量が多すぎます。";

pub fn is_valid_email(email: &str) -> bool {
  EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
  PHONE_PATTERN.is_match(&phone.replace('-', ""))
}

/// Tomorrow, or the day after when `now` is at or past the cutoff hour in the
/// store's local time.
pub fn earliest_delivery_date(now: DateTime<Utc>, offset: FixedOffset, cutoff_hour: u32) -> NaiveDate {
  let local = now.with_timezone(&offset);
  let days = if local.hour() >= cutoff_hour { 2 } else { 1 };
  local
    .date_naive()
    .checked_add_days(Days::new(days))
    .unwrap_or(NaiveDate::MAX)
}

/// Rules the storefront enforces; the dashboard relaxes the delivery-date bound.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRules {
  pub earliest_delivery: Option<NaiveDate>,
}

/// Collects every problem with `submission`. On success returns the parsed delivery date.
pub fn validate_submission(submission: &OrderSubmission, rules: SubmissionRules) -> Result<NaiveDate, Vec<String>> {
  let mut errors = Vec::new();

  let required = [
    &submission.customer_name,
    &submission.customer_address,
    &submission.customer_phone,
    &submission.customer_email,
    &submission.delivery_date,
  ];
  if required.iter().any(|v| v.trim().is_empty()) || submission.items.is_empty() {
    errors.push(MSG_REQUIRED.to_string());
  }

  let email = submission.customer_email.trim();
  if !email.is_empty() && !is_valid_email(email) {
    errors.push(MSG_EMAIL.to_string());
  }
  let phone = submission.customer_phone.trim();
  if !phone.is_empty() && !is_valid_phone(phone) {
    errors.push(MSG_PHONE.to_string());
  }

  if submission.items.iter().any(|item| item.quantity < 1) {
    errors.push(MSG_QUANTITY.to_string());
  }
  if submission.items.iter().any(|item| item.quantity > i64::from(u32::MAX)) {
    errors.push(MSG_QUANTITY_TOO_LARGE.to_string());
  }

  let delivery_date = match submission.delivery_date.trim() {
    "" => None,
    raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
      Ok(date) => Some(date),
      Err(_) => {
        errors.push(MSG_DATE_FORMAT.to_string());
        None
      }
    },
  };
  if let (Some(date), Some(earliest)) = (delivery_date, rules.earliest_delivery) {
    if date < earliest {
      errors.push(format!(
        "配送希望日は{}以降の日付を指定してください。",
        earliest.format("%Y-%m-%d")
      ));
    }
  }

  match delivery_date {
    Some(date) if errors.is_empty() => Ok(date),
    _ => Err(errors),
  }
}
