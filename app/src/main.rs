// app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use bento_orders::config::AppConfig;
use bento_orders::scheduler;
use bento_orders::services::{auth_service, DatabaseExporter, LogMailer, Mailer, SendGridMailer, SnapshotExporter};
use bento_orders::state::AppState;
use bento_orders::store::{DocumentStore, MemoryStore, PgStore};
use bento_orders::web::configure_app_routes;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let builder = tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE);

  if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
    builder.json().init();
  } else {
    builder.init();
  }
}

fn other_error(message: String) -> std::io::Error {
  std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  init_tracing();

  // `bento_orders_server hash-token <token>` prints a value for ADMIN_TOKEN_HASH.
  let args: Vec<String> = std::env::args().collect();
  if args.get(1).map(String::as_str) == Some("hash-token") {
    let token = args
      .get(2)
      .ok_or_else(|| other_error("usage: bento_orders_server hash-token <token>".to_string()))?;
    let hash = auth_service::hash_admin_token(token).map_err(|e| other_error(e.to_string()))?;
    println!("{}", hash);
    return Ok(());
  }

  tracing::info!("Starting bento order service...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    other_error(format!("Configuration error: {}", e))
  })?;

  let store: Arc<dyn DocumentStore> = match &app_config.database_url {
    Some(url) => {
      let pg = PgStore::connect(url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to the database.");
        other_error(format!("Database connection error: {}", e))
      })?;
      tracing::info!("Connected to the document database.");
      Arc::new(pg)
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using the in-memory document store.");
      Arc::new(MemoryStore::new())
    }
  };

  let mailer: Arc<dyn Mailer> = match &app_config.sendgrid_api_key {
    Some(key) => Arc::new(
      SendGridMailer::new(key.clone(), &app_config.mail_api_base_url).map_err(|e| other_error(e.to_string()))?,
    ),
    None => {
      tracing::warn!("SENDGRID_API_KEY not set; emails will only be logged.");
      Arc::new(LogMailer)
    }
  };

  let exporter: Arc<dyn DatabaseExporter> =
    Arc::new(SnapshotExporter::new(store.clone(), app_config.backup_root.clone()));

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(app_config, store, mailer, exporter);
  tracing::info!("Pipelines registered.");

  let export_task = scheduler::spawn_nightly_export(app_state.clone());

  tracing::info!("Attempting to bind server to {}...", server_address);
  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  export_task.abort();
  result
}
