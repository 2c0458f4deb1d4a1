//! 商品库存账本

pub mod handler;
pub mod model;
pub mod service;

pub use model::{default_catalog, Product};
pub use service::{StockError, StockLedger, STOCK_DATA_KEY};
