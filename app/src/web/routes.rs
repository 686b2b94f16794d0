// app/src/web/routes.rs

use crate::state::AppState;
use crate::web::handlers::{callable_handlers, catalog_handlers, order_handlers, settings_handlers};
use actix_web::{web, HttpResponse};

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "region": app_state.config.region,
  }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    // Callable functions
    .route(
      "/getPublicData",
      web::post().to(callable_handlers::get_public_data_handler),
    )
    .route("/submitOrder", web::post().to(callable_handlers::submit_order_handler))
    .route(
      "/sendCompletionEmail",
      web::post().to(callable_handlers::send_completion_email_handler),
    )
    // Dashboard backend
    .service(
      web::scope("/admin")
        .service(
          web::scope("/orders")
            .route("", web::get().to(order_handlers::list_orders_handler))
            .route("", web::post().to(order_handlers::create_order_handler))
            .route("/{order_id}", web::put().to(order_handlers::update_order_handler))
            .route(
              "/{order_id}/status",
              web::put().to(order_handlers::update_order_status_handler),
            ),
        )
        .service(
          web::scope("/products")
            .route("", web::get().to(catalog_handlers::list_products_handler))
            .route("", web::post().to(catalog_handlers::create_product_handler))
            .route("/{product_id}", web::put().to(catalog_handlers::update_product_handler))
            .route("/{product_id}", web::delete().to(catalog_handlers::delete_product_handler))
            .route(
              "/{product_id}/duplicate",
              web::post().to(catalog_handlers::duplicate_product_handler),
            ),
        )
        .service(
          web::scope("/options")
            .route("/{kind}", web::get().to(catalog_handlers::list_options_handler))
            .route("/{kind}", web::post().to(catalog_handlers::add_option_handler))
            .route(
              "/{kind}/{option_id}",
              web::delete().to(catalog_handlers::delete_option_handler),
            ),
        )
        .service(
          web::scope("/settings")
            .route(
              "/email-templates",
              web::get().to(settings_handlers::get_email_templates_handler),
            )
            .route(
              "/email-templates",
              web::put().to(settings_handlers::save_email_templates_handler),
            )
            .route("/store-info", web::get().to(settings_handlers::get_store_info_handler))
            .route("/store-info", web::put().to(settings_handlers::save_store_info_handler))
            .route("/placeholders", web::get().to(settings_handlers::placeholders_handler)),
        ),
    );
}
