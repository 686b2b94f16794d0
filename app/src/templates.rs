// app/src/templates.rs

//! Placeholder substitution for notification emails.

use crate::models::{EmailTemplates, Order};
use chrono::FixedOffset;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{[A-Za-z]+\}").expect("Invalid template token regex pattern"));

pub const NUMBER_PENDING: &str = "採番中";
pub const NOT_SPECIFIED: &str = "指定なし";
pub const NO_REMARKS: &str = "なし";

/// Every supported token with the description shown to staff editing templates.
pub const PLACEHOLDERS: &[(&str, &str)] = &[
  ("{customerName}", "お客様のお名前"),
  ("{orderNumber}", "注文番号"),
  ("{totalPrice}", "合計金額"),
  ("{orderDate}", "注文日時"),
  ("{deliveryDate}", "配送希望日"),
  ("{customerAddress}", "お客様の住所"),
  ("{customerPhone}", "お客様の電話番号"),
  ("{itemsList}", "注文商品の一覧"),
  ("{dashboardUrl}", "管理者向け注文詳細URL"),
  ("{mealType}", "食事タイミング"),
  ("{servingStyles}", "提供スタイル"),
  ("{paymentMethod}", "支払い方法"),
  ("{remarks}", "備考欄"),
];

const ORDER_CONFIRM_SUBJECT: &str = "【ご注文確認】ご注文ありがとうございます（注文番号: {orderNumber}）";
const ORDER_CONFIRM_BODY: &str = "{customerName} 様

この度はご注文いただき、誠にありがとうございます。
以下の内容でご注文を承りました。

注文番号: {orderNumber}
ご注文日時: {orderDate}
お届け希望日: {deliveryDate}
お食事: {mealType}
提供スタイル: {servingStyles}
お支払い方法: {paymentMethod}

ご注文内容:
{itemsList}

合計金額: {totalPrice}円

備考: {remarks}
";

const ADMIN_NOTIFY_SUBJECT: &str = "【新規注文】注文番号: {orderNumber}（{customerName} 様）";
const ADMIN_NOTIFY_BODY: &str = "新しい注文が入りました。

注文番号: {orderNumber}
ご注文日時: {orderDate}
お名前: {customerName}
ご住所: {customerAddress}
電話番号: {customerPhone}
お届け希望日: {deliveryDate}
お食事: {mealType}
提供スタイル: {servingStyles}
お支払い方法: {paymentMethod}

ご注文内容:
{itemsList}

合計金額: {totalPrice}円
備考: {remarks}

注文詳細: {dashboardUrl}
";

const PROCESS_COMPLETE_SUBJECT: &str = "【ご準備完了】ご注文の準備が整いました（注文番号: {orderNumber}）";
const PROCESS_COMPLETE_BODY: &str = "{customerName} 様

ご注文いただいたお弁当の準備が整いました。
お届け予定日: {deliveryDate}

ご注文内容:
{itemsList}

合計金額: {totalPrice}円

またのご利用をお待ちしております。
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
  OrderConfirmation,
  AdminNotification,
  ProcessComplete,
}

/// Values for every placeholder, computed once per order.
#[derive(Debug, Clone)]
pub struct TemplateVars {
  values: Vec<(&'static str, String)>,
}

impl TemplateVars {
  pub fn for_order(order: &Order, dashboard_url: &str, offset: FixedOffset) -> Self {
    let order_number = order
      .order_number
      .map(|n| n.to_string())
      .unwrap_or_else(|| NUMBER_PENDING.to_string());
    let items_list = order
      .items
      .iter()
      .map(|item| format!("{} x {}", item.name, item.quantity))
      .collect::<Vec<_>>()
      .join("\n");
    let serving_styles = if order.serving_styles.is_empty() {
      NOT_SPECIFIED.to_string()
    } else {
      order.serving_styles.join(", ")
    };
    let remarks = if order.remarks.trim().is_empty() {
      NO_REMARKS.to_string()
    } else {
      order.remarks.clone()
    };

    Self {
      values: vec![
        ("{customerName}", order.customer_name.clone()),
        ("{orderNumber}", order_number),
        ("{totalPrice}", order.total_price.to_string()),
        (
          "{orderDate}",
          order.order_date.with_timezone(&offset).format("%Y/%m/%d %H:%M").to_string(),
        ),
        ("{deliveryDate}", order.delivery_date.format("%Y-%m-%d").to_string()),
        ("{customerAddress}", order.customer_address.clone()),
        ("{customerPhone}", order.customer_phone.clone()),
        ("{itemsList}", items_list),
        ("{dashboardUrl}", dashboard_url.to_string()),
        ("{mealType}", order.meal_type.clone()),
        ("{servingStyles}", serving_styles),
        ("{paymentMethod}", order.payment_method.clone()),
        ("{remarks}", remarks),
      ],
    }
  }
}

/// Replaces known tokens in a single pass over the template; anything else in
/// braces is left as written. Substituted values are never scanned again.
pub fn render(template: &str, vars: &TemplateVars) -> String {
  TOKEN_PATTERN
    .replace_all(template, |caps: &Captures| {
      vars
        .values
        .iter()
        .find(|(token, _)| *token == &caps[0])
        .map_or_else(|| caps[0].to_string(), |(_, value)| value.clone())
    })
    .into_owned()
}

/// Subject and body for `kind`, falling back to built-in text for unset templates.
pub fn compose(kind: EmailKind, templates: &EmailTemplates, vars: &TemplateVars) -> (String, String) {
  let ((subject, body), (default_subject, default_body)) = match kind {
    EmailKind::OrderConfirmation => (templates.order_confirm(), (ORDER_CONFIRM_SUBJECT, ORDER_CONFIRM_BODY)),
    EmailKind::AdminNotification => (templates.admin_notify(), (ADMIN_NOTIFY_SUBJECT, ADMIN_NOTIFY_BODY)),
    EmailKind::ProcessComplete => (
      templates.process_complete(),
      (PROCESS_COMPLETE_SUBJECT, PROCESS_COMPLETE_BODY),
    ),
  };
  (
    render(subject.unwrap_or(default_subject), vars),
    render(body.unwrap_or(default_body), vars),
  )
}
