//! # 店铺后端
//!
//! 商品评论（可附带图片）与商品库存账本，通过 Axum 提供 HTTP 接口。
//!
//! 分层结构：
//! - `app`: 评论、图片、库存三个业务模块（model / service / handler）
//! - `core`: 统一错误、响应结构、中间件
//! - `infrastructure`: JSON 文档存储、键值存储、日志
//! - `config`: TOML 配置
//! - `server`: 路由组装与启动

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod server;

pub use app::AppState;
pub use config::{load_config, Config};
pub use crate::core::error::CoreError;
