//! 商品评论

pub mod handler;
pub mod model;
pub mod service;

pub use model::{average_rating, ProductReviews, Rating, Review, ReviewDocument, ReviewSubmission};
pub use service::ReviewService;
