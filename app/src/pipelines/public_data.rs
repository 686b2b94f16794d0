// app/src/pipelines/public_data.rs

//! `getPublicData`: catalog, option lists and store info for the storefront.

use crate::errors::{AppError, Result};
use crate::models::{NamedOption, Product, StoreInfo};
use crate::pipelines::contexts::PublicDataCtxData;
use crate::state::AppState;
use crate::store::{self, FieldFilter, Stored, PAYMENT_METHODS, PRODUCTS, SERVING_STYLES, SETTINGS, STORE_INFO_ID};
use bento_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use futures_util::future::try_join4;
use serde::Serialize;
use tracing::{error, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicData {
  pub products: Vec<Stored<Product>>,
  pub serving_styles: Vec<Stored<NamedOption>>,
  pub payment_methods: Vec<Stored<NamedOption>>,
  pub store_info: StoreInfo,
}

pub fn register_public_data_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<PublicDataCtxData, AppError>::new(&[
    ("fetch_collections", false, None),
    ("normalize_prices", false, None),
  ]);

  p.on("fetch_collections", |ctx: ContextData<PublicDataCtxData>| async move {
    let app_state = ctx.read().app_state.clone();
    let store = app_state.store.as_ref();

    let reads = try_join4(
      store::list_typed::<Product>(store, PRODUCTS, Some(FieldFilter::eq("isVisible", true))),
      store::list_typed::<NamedOption>(store, SERVING_STYLES, None),
      store::list_typed::<NamedOption>(store, PAYMENT_METHODS, None),
      store::get_typed::<StoreInfo>(store, SETTINGS, STORE_INFO_ID),
    )
    .await;

    // No partial payloads: one failed read fails the whole call.
    let (mut products, mut serving_styles, mut payment_methods, store_info) = reads.map_err(|e| {
      error!(error = %e, "Error fetching public data.");
      AppError::Internal("Unable to fetch public data.".to_string())
    })?;

    products.sort_by(|a, b| a.data.name.cmp(&b.data.name));
    serving_styles.sort_by(|a, b| a.data.name.cmp(&b.data.name));
    payment_methods.sort_by(|a, b| a.data.name.cmp(&b.data.name));

    ctx.write().payload = Some(PublicData {
      products,
      serving_styles,
      payment_methods,
      store_info: store_info.map(|s| s.data).unwrap_or_default(),
    });
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("normalize_prices", |ctx: ContextData<PublicDataCtxData>| async move {
    if let Some(payload) = ctx.write().payload.as_mut() {
      for product in payload.products.iter_mut() {
        product.data = product.data.clone().normalized();
      }
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(p);
}

#[instrument(name = "pipelines::public_data", skip(app_state), err(Display))]
pub async fn get_public_data(app_state: &AppState) -> Result<PublicData> {
  let ctx = ContextData::new(PublicDataCtxData {
    app_state: app_state.clone(),
    payload: None,
  });
  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => ctx
      .write()
      .payload
      .take()
      .ok_or_else(|| AppError::Internal("Unable to fetch public data.".to_string())),
    PipelineResult::Stopped => Err(AppError::Internal("Unable to fetch public data.".to_string())),
  }
}
