// tests/order_created_tests.rs

mod common;

use bento_orders::errors::AppError;
use bento_orders::pipelines::order_created::run_order_created;
use bento_orders::sequencer::AssignOutcome;
use common::{harness, load_order, sample_order, seed_order, seed_sender_and_admin, seed_templates, SHOP_ADMIN, SHOP_FROM};
use serde_json::json;
use serial_test::serial;
use std::sync::atomic::Ordering;

#[tokio::test]
#[serial]
async fn numbers_the_order_and_sends_both_emails() {
  let h = harness();
  seed_sender_and_admin(h.store.as_ref()).await;
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  let summary = run_order_created(&h.state, &order_id).await.unwrap();
  assert_eq!(summary.assignment, Some(AssignOutcome::Assigned(201)));
  assert!(summary.customer_email_sent);
  assert!(summary.admin_email_sent);
  assert!(summary.completed);

  assert_eq!(load_order(h.store.as_ref(), &order_id).await.order_number, Some(201));

  let customer = h.mailer.sent_to("taro@example.com");
  assert_eq!(customer.len(), 1);
  assert_eq!(customer[0].from, SHOP_FROM);
  assert!(customer[0].subject.contains("201"));
  assert!(customer[0].text.contains("Bento A x 2\nBento B x 1"));
  assert!(customer[0].text.contains("1300"));

  let admin = h.mailer.sent_to(SHOP_ADMIN);
  assert_eq!(admin.len(), 1);
  assert!(admin[0]
    .text
    .contains(&format!("https://bento-orders.web.app/dashboard.html?orderId={}", order_id)));
}

#[tokio::test]
#[serial]
async fn configured_templates_are_rendered() {
  let h = harness();
  seed_templates(
    h.store.as_ref(),
    json!({
      "fromEmail": SHOP_FROM,
      "adminEmail": SHOP_ADMIN,
      "orderConfirmSubject": "ご注文 #{orderNumber}",
      "orderConfirmBody": "{customerName} 様 {totalPrice}円 {servingStyles}",
      "adminNotifySubject": "",
    }),
  )
  .await;
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  run_order_created(&h.state, &order_id).await.unwrap();

  let customer = &h.mailer.sent_to("taro@example.com")[0];
  assert_eq!(customer.subject, "ご注文 #201");
  assert_eq!(customer.text, "山田 太郎 様 1300円 刻み, おかゆ");

  // An empty subject counts as unset and the built-in one is used.
  let admin = &h.mailer.sent_to(SHOP_ADMIN)[0];
  assert!(admin.subject.contains("新規注文"));
}

#[tokio::test]
#[serial]
async fn redelivered_event_sends_nothing_twice() {
  let h = harness();
  seed_sender_and_admin(h.store.as_ref()).await;
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  run_order_created(&h.state, &order_id).await.unwrap();
  let again = run_order_created(&h.state, &order_id).await.unwrap();

  assert_eq!(again.assignment, Some(AssignOutcome::AlreadyAssigned(201)));
  assert!(!again.completed);
  assert_eq!(h.mailer.sent().len(), 2);
  assert_eq!(load_order(h.store.as_ref(), &order_id).await.order_number, Some(201));
}

#[tokio::test]
#[serial]
async fn missing_addresses_skip_emails_but_keep_the_number() {
  let h = harness();
  seed_templates(h.store.as_ref(), json!({ "fromEmail": SHOP_FROM })).await;
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  let summary = run_order_created(&h.state, &order_id).await.unwrap();
  assert_eq!(summary.assignment, Some(AssignOutcome::Assigned(201)));
  assert!(!summary.completed);
  assert_eq!(h.mailer.attempts(), 0);
  assert_eq!(load_order(h.store.as_ref(), &order_id).await.order_number, Some(201));
}

#[tokio::test]
#[serial]
async fn no_settings_document_at_all_skips_emails() {
  let h = harness();
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  let summary = run_order_created(&h.state, &order_id).await.unwrap();
  assert!(!summary.customer_email_sent);
  assert!(!summary.admin_email_sent);
  assert_eq!(h.mailer.attempts(), 0);
}

#[tokio::test]
#[serial]
async fn one_failed_email_does_not_block_the_other() {
  let h = harness();
  seed_sender_and_admin(h.store.as_ref()).await;
  h.mailer.fail_for("taro@example.com");
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  let summary = run_order_created(&h.state, &order_id).await.unwrap();
  assert!(!summary.customer_email_sent);
  assert!(summary.admin_email_sent);
  assert!(summary.completed);
  assert_eq!(h.mailer.attempts(), 2);
  assert_eq!(load_order(h.store.as_ref(), &order_id).await.order_number, Some(201));
}

#[tokio::test]
#[serial]
async fn counter_failure_aborts_before_any_email() {
  let h = harness();
  seed_sender_and_admin(h.store.as_ref()).await;
  h.store.fail_sequence.store(true, Ordering::SeqCst);
  let order_id = seed_order(h.store.as_ref(), &sample_order()).await;

  let err = run_order_created(&h.state, &order_id).await.unwrap_err();
  assert!(matches!(err, AppError::Store(_)));
  assert_eq!(h.mailer.attempts(), 0);
  assert_eq!(load_order(h.store.as_ref(), &order_id).await.order_number, None);
}

#[tokio::test]
#[serial]
async fn unknown_order_fails_without_side_effects() {
  let h = harness();
  seed_sender_and_admin(h.store.as_ref()).await;

  let err = run_order_created(&h.state, "does-not-exist").await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
  assert_eq!(h.mailer.attempts(), 0);
}
