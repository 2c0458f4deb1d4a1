//! 评论图片附件

pub mod model;
pub mod service;

pub use model::{PhotoUpload, PHOTO_FIELD, TOO_LARGE, UPLOADS_ROUTE};
pub use service::{PhotoError, PhotoStore};
