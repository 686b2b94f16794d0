// app/src/config.rs

use crate::errors::{AppError, Result};
use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "asia-northeast1";
pub const DEFAULT_ORDER_NUMBER_START: i64 = 201;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the service on the in-memory document store.
  pub database_url: Option<String>,
  pub project_id: String,
  pub dashboard_base_url: String,
  pub region: String,

  pub sendgrid_api_key: Option<String>,
  pub mail_api_base_url: String,

  pub app_check_tokens: Vec<String>,
  pub admin_token_hash: Option<String>,

  pub backup_root: PathBuf,
  pub export_time: NaiveTime,
  pub store_offset: FixedOffset,

  pub order_number_start: i64,
  pub order_cutoff_hour: u32,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", get_env("SERVER_PORT"), 8080u16)?;
    let database_url = get_env("DATABASE_URL");

    let project_id = get_env("PROJECT_ID").unwrap_or_else(|| "bento-orders".to_string());
    let dashboard_base_url = get_env("DASHBOARD_BASE_URL")
      .unwrap_or_else(|| format!("https://{}.web.app", project_id))
      .trim_end_matches('/')
      .to_string();
    let region = get_env("FUNCTIONS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());

    let sendgrid_api_key = get_env("SENDGRID_API_KEY");
    let mail_api_base_url = get_env("MAIL_API_BASE_URL").unwrap_or_else(|| "https://api.sendgrid.com".to_string());

    let app_check_tokens = get_env("APP_CHECK_TOKENS")
      .map(|raw| {
        raw
          .split(',')
          .map(str::trim)
          .filter(|t| !t.is_empty())
          .map(str::to_string)
          .collect()
      })
      .unwrap_or_default();
    let admin_token_hash = get_env("ADMIN_TOKEN_HASH");

    let backup_root = PathBuf::from(get_env("BACKUP_ROOT").unwrap_or_else(|| "./backups-bucket".to_string()));
    let export_time = match get_env("EXPORT_TIME") {
      Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
        .map_err(|e| AppError::Config(format!("Invalid EXPORT_TIME '{}': {}", raw, e)))?,
      None => NaiveTime::from_hms_opt(3, 0, 0).ok_or_else(|| AppError::Config("invalid default export time".into()))?,
    };
    let offset_hours = parse_or("EXPORT_UTC_OFFSET_HOURS", get_env("EXPORT_UTC_OFFSET_HOURS"), 9i32)?;
    let store_offset = FixedOffset::east_opt(offset_hours * 3600)
      .ok_or_else(|| AppError::Config(format!("EXPORT_UTC_OFFSET_HOURS out of range: {}", offset_hours)))?;

    let order_number_start = parse_or("ORDER_NUMBER_START", get_env("ORDER_NUMBER_START"), DEFAULT_ORDER_NUMBER_START)?;
    let order_cutoff_hour = parse_or("ORDER_CUTOFF_HOUR", get_env("ORDER_CUTOFF_HOUR"), 15u32)?;
    if order_cutoff_hour > 23 {
      return Err(AppError::Config(format!("ORDER_CUTOFF_HOUR must be 0-23, got {}", order_cutoff_hour)));
    }

    tracing::info!(
      region = %region,
      store = if database_url.is_some() { "postgres" } else { "memory" },
      mailer = if sendgrid_api_key.is_some() { "sendgrid" } else { "log" },
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      project_id,
      dashboard_base_url,
      region,
      sendgrid_api_key,
      mail_api_base_url,
      app_check_tokens,
      admin_token_hash,
      backup_root,
      export_time,
      store_offset,
      order_number_start,
      order_cutoff_hour,
    })
  }

  /// Link from notification emails to the order in the dashboard.
  pub fn dashboard_order_url(&self, order_id: &str) -> String {
    format!("{}/dashboard.html?orderId={}", self.dashboard_base_url, order_id)
  }
}

impl Default for AppConfig {
  /// Local defaults; tests start from here and override fields.
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      project_id: "bento-orders".to_string(),
      dashboard_base_url: "https://bento-orders.web.app".to_string(),
      region: DEFAULT_REGION.to_string(),
      sendgrid_api_key: None,
      mail_api_base_url: "https://api.sendgrid.com".to_string(),
      app_check_tokens: Vec::new(),
      admin_token_hash: None,
      backup_root: PathBuf::from("./backups-bucket"),
      export_time: NaiveTime::MIN + chrono::Duration::hours(3),
      store_offset: FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix()),
      order_number_start: DEFAULT_ORDER_NUMBER_START,
      order_cutoff_hour: 15,
    }
  }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, value, e))),
    None => Ok(default),
  }
}
