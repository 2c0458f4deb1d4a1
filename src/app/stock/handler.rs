//! 库存处理器

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::Serialize;
use tracing::error;

use super::{
    model::{Product, StockDecrease, StockUpdate},
    service::{StockError, StockLedger},
};
use crate::app::AppState;
use crate::core::{error::CoreError, response::ApiResponse};

#[derive(Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStock {
    pub product: Product,
    pub in_stock: bool,
    pub stock_quantity: u32,
}

#[derive(Serialize)]
pub struct UpdatedProduct {
    pub product: Product,
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductList>>, CoreError> {
    let ledger = state.stock.lock().await;
    Ok(Json(ApiResponse::success(ProductList {
        products: ledger.products().to_vec(),
    })))
}

pub async fn get_product_stock(
    State(state): State<AppState>,
    Path(product_name): Path<String>,
) -> Result<Json<ApiResponse<ProductStock>>, CoreError> {
    let ledger = state.stock.lock().await;
    let product = ledger.product(&product_name).cloned().ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(ProductStock {
        in_stock: product.is_available(),
        stock_quantity: product.stock_quantity,
        product,
    })))
}

pub async fn update_stock_status(
    State(state): State<AppState>,
    Path(product_name): Path<String>,
    body: Result<Json<StockUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<UpdatedProduct>>, CoreError> {
    let Json(update) = body.map_err(|e| CoreError::BadRequest(e.body_text()))?;

    let product = with_ledger(&state, move |ledger| {
        ledger.update_stock_status(&product_name, update.in_stock, update.quantity)
    })
    .await?
    .map_err(save_failed)?
    .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(UpdatedProduct { product })))
}

pub async fn decrease_stock(
    State(state): State<AppState>,
    Path(product_name): Path<String>,
    body: Result<Json<StockDecrease>, JsonRejection>,
) -> Result<Json<ApiResponse<UpdatedProduct>>, CoreError> {
    let Json(decrease) = body.map_err(|e| CoreError::BadRequest(e.body_text()))?;

    let product = with_ledger(&state, move |ledger| {
        ledger.decrease_stock(&product_name, decrease.amount)
    })
    .await?
    .map_err(save_failed)?
    .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(UpdatedProduct { product })))
}

pub async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductList>>, CoreError> {
    let products = with_ledger(&state, |ledger| {
        ledger.refresh();
        ledger.products().to_vec()
    })
    .await?;
    Ok(Json(ApiResponse::success(ProductList { products })))
}

/// 账本的键值存储是同步文件读写，放到阻塞线程池里执行
async fn with_ledger<R, F>(state: &AppState, f: F) -> Result<R, CoreError>
where
    F: FnOnce(&mut StockLedger) -> R + Send + 'static,
    R: Send + 'static,
{
    let mut ledger = state.stock.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || f(&mut ledger))
        .await
        .map_err(|e| {
            error!("库存任务执行失败: {}", e);
            CoreError::InternalServerError("Failed to update stock".to_string())
        })
}

fn not_found() -> CoreError {
    CoreError::NotFound("Product not found".to_string())
}

fn save_failed(err: StockError) -> CoreError {
    error!("保存库存失败: {}", err);
    CoreError::InternalServerError("Failed to update stock".to_string())
}
