// app/src/web/handlers/catalog_handlers.rs

//! Dashboard management of products, serving styles and payment methods.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{NamedOption, Product};
use crate::state::AppState;
use crate::store::{self, Stored, PAYMENT_METHODS, PRODUCTS, SERVING_STYLES};
use crate::web::extractors::AuthenticatedAdmin;

pub const COPY_SUFFIX: &str = " (コピー)";

fn validate_product(product: &Product) -> Result<(), AppError> {
  let mut problems = Vec::new();
  if product.name.trim().is_empty() {
    problems.push("Product name is required.".to_string());
  }
  if product.price < 0 {
    problems.push("Price cannot be negative.".to_string());
  }
  if product.discount_price.is_some_and(|p| p < 0) {
    problems.push("Discount price cannot be negative.".to_string());
  }
  if problems.is_empty() {
    Ok(())
  } else {
    Err(AppError::Validation(problems))
  }
}

async fn load_product(app_state: &AppState, product_id: &str) -> Result<Product, AppError> {
  store::get_typed::<Product>(app_state.store.as_ref(), PRODUCTS, product_id)
    .await?
    .map(|stored| stored.data)
    .ok_or_else(|| AppError::NotFound(format!("Product {} was not found.", product_id)))
}

#[instrument(name = "handler::list_products", skip_all)]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
  let mut products: Vec<Stored<Product>> = store::list_typed(app_state.store.as_ref(), PRODUCTS, None).await?;
  products.sort_by(|a, b| a.data.name.cmp(&b.data.name));
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::create_product", skip_all)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  payload: web::Json<Product>,
) -> Result<HttpResponse, AppError> {
  let product = payload.into_inner();
  validate_product(&product)?;
  let id = app_state.store.insert(PRODUCTS, store::to_document(&product)?).await?;
  info!(product_id = %id, name = %product.name, "Product created.");
  Ok(HttpResponse::Created().json(json!({ "id": id })))
}

#[instrument(name = "handler::update_product", skip(app_state, _admin, payload), fields(product_id = %path.as_str()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
  payload: web::Json<Product>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = payload.into_inner();
  validate_product(&product)?;
  load_product(&app_state, &product_id).await?;

  // Full replace, so clearing the discount price removes it.
  app_state
    .store
    .set(PRODUCTS, &product_id, store::to_document(&product)?, false)
    .await?;
  info!("Product updated.");
  Ok(HttpResponse::Ok().json(json!({ "id": product_id })))
}

#[instrument(name = "handler::delete_product", skip(app_state, _admin), fields(product_id = %path.as_str()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  app_state.store.delete(PRODUCTS, path.as_str()).await?;
  info!("Product deleted.");
  Ok(HttpResponse::NoContent().finish())
}

/// The copy starts hidden so it can be edited before customers see it.
pub fn duplicate_of(product: Product) -> Product {
  Product {
    name: format!("{}{}", product.name, COPY_SUFFIX),
    is_visible: false,
    ..product
  }
}

#[instrument(name = "handler::duplicate_product", skip(app_state, _admin), fields(product_id = %path.as_str()))]
pub async fn duplicate_product_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let copy = duplicate_of(load_product(&app_state, path.as_str()).await?);
  let id = app_state.store.insert(PRODUCTS, store::to_document(&copy)?).await?;
  info!(copy_id = %id, "Product duplicated.");
  Ok(HttpResponse::Created().json(json!({ "id": id, "name": copy.name })))
}

/// The two small reference lists share one set of handlers.
fn option_collection(kind: &str) -> Result<&'static str, AppError> {
  match kind {
    "servingStyles" => Ok(SERVING_STYLES),
    "paymentMethods" => Ok(PAYMENT_METHODS),
    other => Err(AppError::NotFound(format!("Unknown option list '{}'.", other))),
  }
}

#[instrument(name = "handler::list_options", skip(app_state, _admin))]
pub async fn list_options_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let collection = option_collection(&path)?;
  let mut options: Vec<Stored<NamedOption>> = store::list_typed(app_state.store.as_ref(), collection, None).await?;
  options.sort_by(|a, b| a.data.name.cmp(&b.data.name));
  Ok(HttpResponse::Ok().json(json!({ "options": options })))
}

#[derive(Debug, Deserialize)]
pub struct NewOption {
  pub name: String,
}

#[instrument(name = "handler::add_option", skip(app_state, _admin, payload))]
pub async fn add_option_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
  payload: web::Json<NewOption>,
) -> Result<HttpResponse, AppError> {
  let collection = option_collection(&path)?;
  let name = payload.name.trim();
  if name.is_empty() {
    return Err(AppError::InvalidArgument("Name cannot be empty.".to_string()));
  }
  let option = NamedOption { name: name.to_string() };
  let id = app_state.store.insert(collection, store::to_document(&option)?).await?;
  info!(%collection, option_id = %id, "Option added.");
  Ok(HttpResponse::Created().json(json!({ "id": id, "name": option.name })))
}

#[instrument(name = "handler::delete_option", skip(app_state, _admin))]
pub async fn delete_option_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (kind, option_id) = path.into_inner();
  let collection = option_collection(&kind)?;
  app_state.store.delete(collection, &option_id).await?;
  Ok(HttpResponse::NoContent().finish())
}
