//! 评论业务服务

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::model::{average_rating, ProductReviews, Review, ReviewDocument, ReviewSubmission};
use crate::app::photos::{PhotoStore, PhotoUpload};
use crate::core::error::CoreError;
use crate::infrastructure::{DocumentStore, StoreError};

const LOAD_FAILED: &str = "Failed to load reviews";
const SUBMIT_FAILED: &str = "Failed to submit review";
const DELETE_FAILED: &str = "Failed to delete review";

#[derive(Clone)]
pub struct ReviewService {
    documents: DocumentStore,
    photos: PhotoStore,
    /// 提交与删除都是“读-改-写”整份文档，同一进程内串行执行
    write_lock: Arc<Mutex<()>>,
}

impl ReviewService {
    pub fn new(documents: DocumentStore, photos: PhotoStore) -> Self {
        Self {
            documents,
            photos,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    /// 创建空文档和上传目录
    pub async fn initialize(&self) -> Result<(), CoreError> {
        self.documents
            .ensure_initialized::<ReviewDocument>()
            .await
            .map_err(|e| storage_failure(LOAD_FAILED, e))?;
        self.photos.ensure_dir().await.map_err(|e| {
            error!("创建上传目录失败: {}", e);
            CoreError::InternalServerError("Failed to prepare uploads directory".to_string())
        })
    }

    pub async fn get_reviews(&self, product_name: &str) -> Result<ProductReviews, CoreError> {
        let document = self.load(LOAD_FAILED).await?;
        let reviews = document.reviews_for(product_name).to_vec();
        let average_rating = average_rating(&reviews);

        Ok(ProductReviews {
            reviews,
            average_rating,
        })
    }

    pub async fn list_all_reviews(&self) -> Result<ReviewDocument, CoreError> {
        self.load(LOAD_FAILED).await
    }

    /// 校验输入、保存图片、把新评论插到最前面并写回整份文档
    pub async fn submit_review(
        &self,
        product_name: &str,
        submission: ReviewSubmission,
        photo: Option<PhotoUpload>,
    ) -> Result<Review, CoreError> {
        let new_review = submission.validate()?;
        let rating = new_review.rating()?;

        let _guard = self.write_lock.lock().await;
        let mut document = self.load(SUBMIT_FAILED).await?;

        let photo = match photo {
            Some(upload) => Some(self.photos.save(&upload).await?),
            None => None,
        };

        let review = Review {
            id: next_review_id(&document),
            rating,
            reviewer_name: new_review.reviewer_name,
            review_text: new_review.review_text,
            date: Utc::now(),
            photo,
        };

        document.prepend(product_name, review.clone());

        if let Err(e) = self.documents.save(&document).await {
            if let Some(reference) = &review.photo {
                self.remove_photo(reference).await;
            }
            return Err(storage_failure(SUBMIT_FAILED, e));
        }

        info!(
            "商品 {} 新增评论 {} (评分 {})",
            product_name,
            review.id,
            review.rating.value()
        );
        Ok(review)
    }

    /// 删除评论；图片文件删除失败只记录日志
    pub async fn delete_review(
        &self,
        product_name: &str,
        review_id: &str,
    ) -> Result<Review, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load(DELETE_FAILED).await?;

        if !document.contains_product(product_name) {
            return Err(CoreError::NotFound("Product not found".to_string()));
        }

        let review = document
            .remove(product_name, review_id)
            .ok_or_else(|| CoreError::NotFound("Review not found".to_string()))?;

        self.documents
            .save(&document)
            .await
            .map_err(|e| storage_failure(DELETE_FAILED, e))?;

        // 文档写回成功后才删除图片文件
        if let Some(reference) = &review.photo {
            self.remove_photo(reference).await;
        }

        info!("已删除商品 {} 的评论 {}", product_name, review_id);
        Ok(review)
    }

    async fn load(&self, failure: &str) -> Result<ReviewDocument, CoreError> {
        self.documents
            .load()
            .await
            .map_err(|e| storage_failure(failure, e))
    }

    async fn remove_photo(&self, reference: &str) {
        if let Err(e) = self.photos.remove(reference).await {
            warn!("删除图片文件 {} 失败: {}", reference, e);
        }
    }
}

fn storage_failure(message: &str, err: StoreError) -> CoreError {
    error!("{}: {}", message, err);
    CoreError::InternalServerError(message.to_string())
}

/// 以毫秒时间戳作为 id，同一毫秒内冲突时顺延
fn next_review_id(document: &ReviewDocument) -> String {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let id = millis.to_string();
        if !document.contains_id(&id) {
            return id;
        }
        millis += 1;
    }
}
