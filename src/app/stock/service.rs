//! 库存账本
//!
//! 商品列表在创建账本时从键值存储加载一次并缓存，之后每次修改都同步写回。
//! 存储里没有数据或数据损坏时，重新写入默认商品目录。

use tracing::{info, warn};

use super::model::{default_catalog, Product};
use crate::infrastructure::{KeyValueStore, KvError};

/// 商品列表在键值存储中的键
pub const STOCK_DATA_KEY: &str = "productStockData";

#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("保存库存数据失败: {0}")]
    Store(#[from] KvError),
    #[error("序列化库存数据失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct StockLedger {
    store: Box<dyn KeyValueStore + Send>,
    products: Vec<Product>,
}

impl StockLedger {
    pub fn new(store: impl KeyValueStore + Send + 'static) -> Self {
        let mut store: Box<dyn KeyValueStore + Send> = Box::new(store);
        let products = load_products(store.as_mut());
        Self { store, products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// 未知商品返回 `None`，并记录警告
    pub fn product(&self, product_name: &str) -> Option<&Product> {
        let product = self.products.iter().find(|p| p.name == product_name);
        if product.is_none() {
            warn!("库存中没有商品: {}", product_name);
        }
        product
    }

    pub fn is_in_stock(&self, product_name: &str) -> bool {
        self.product(product_name)
            .map(Product::is_available)
            .unwrap_or(false)
    }

    pub fn get_stock_quantity(&self, product_name: &str) -> u32 {
        self.product(product_name)
            .map(|p| p.stock_quantity)
            .unwrap_or(0)
    }

    /// 设置在售状态；下架时数量强制为 0，数量为 0 时强制下架
    pub fn update_stock_status(
        &mut self,
        product_name: &str,
        in_stock: bool,
        quantity: Option<u32>,
    ) -> Result<Option<Product>, StockError> {
        let Some(product) = self.product_mut(product_name) else {
            return Ok(None);
        };

        product.in_stock = in_stock;
        if let Some(quantity) = quantity {
            product.stock_quantity = quantity;
        }
        if !product.in_stock {
            product.stock_quantity = 0;
        }
        if product.stock_quantity == 0 {
            product.in_stock = false;
        }
        let updated = product.clone();

        self.save()?;
        info!(
            "更新库存 {}: in_stock={} quantity={}",
            updated.name, updated.in_stock, updated.stock_quantity
        );
        Ok(Some(updated))
    }

    /// 扣减库存，最低到 0，到 0 时下架
    pub fn decrease_stock(
        &mut self,
        product_name: &str,
        amount: u32,
    ) -> Result<Option<Product>, StockError> {
        let Some(product) = self.product_mut(product_name) else {
            return Ok(None);
        };

        product.stock_quantity = product.stock_quantity.saturating_sub(amount);
        if product.stock_quantity == 0 {
            product.in_stock = false;
        }
        let updated = product.clone();

        self.save()?;
        info!(
            "商品 {} 库存减少 {}，剩余 {}",
            updated.name, amount, updated.stock_quantity
        );
        Ok(Some(updated))
    }

    /// 丢弃内存中的数据，重新从存储加载
    pub fn refresh(&mut self) {
        self.products = load_products(self.store.as_mut());
    }

    fn product_mut(&mut self, product_name: &str) -> Option<&mut Product> {
        let product = self.products.iter_mut().find(|p| p.name == product_name);
        if product.is_none() {
            warn!("库存中没有商品: {}", product_name);
        }
        product
    }

    fn save(&mut self) -> Result<(), StockError> {
        write_products(self.store.as_mut(), &self.products)
    }
}

fn write_products(store: &mut dyn KeyValueStore, products: &[Product]) -> Result<(), StockError> {
    let raw = serde_json::to_string(products)?;
    store.set(STOCK_DATA_KEY, &raw)?;
    Ok(())
}

fn load_products(store: &mut dyn KeyValueStore) -> Vec<Product> {
    match store.get(STOCK_DATA_KEY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(products) => return products,
            Err(e) => warn!("库存数据损坏，使用默认目录: {}", e),
        },
        Ok(None) => info!("没有库存数据，写入默认目录"),
        Err(e) => warn!("读取库存数据失败，使用默认目录: {}", e),
    }

    let products = default_catalog();
    if let Err(e) = write_products(store, &products) {
        warn!("写入默认库存目录失败: {}", e);
    }
    products
}
