//! 评论处理器

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::debug;

use super::model::{ProductReviews, Review, ReviewDocument, ReviewSubmission};
use crate::app::photos::{PhotoUpload, PHOTO_FIELD, TOO_LARGE};
use crate::app::AppState;
use crate::core::{
    error::CoreError,
    response::{ApiResponse, Message},
};

#[derive(Serialize)]
pub struct SubmittedReview {
    pub review: Review,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct AllReviews {
    pub reviews: ReviewDocument,
}

pub async fn get_reviews(
    State(state): State<AppState>,
    Path(product_name): Path<String>,
) -> Result<Json<ApiResponse<ProductReviews>>, CoreError> {
    let reviews = state.reviews.get_reviews(&product_name).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// 管理用途，不做访问控制
pub async fn list_all_reviews(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AllReviews>>, CoreError> {
    let reviews = state.reviews.list_all_reviews().await?;
    Ok(Json(ApiResponse::success(AllReviews { reviews })))
}

pub async fn submit_review(
    State(state): State<AppState>,
    Path(product_name): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<SubmittedReview>>, CoreError> {
    let mut multipart = multipart.map_err(|e| CoreError::BadRequest(e.body_text()))?;

    let mut submission = ReviewSubmission::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "rating" => submission.rating = Some(text(field).await?),
            "reviewerName" => submission.reviewer_name = Some(text(field).await?),
            "reviewText" => submission.review_text = Some(text(field).await?),
            PHOTO_FIELD => {
                let upload = PhotoUpload {
                    file_name: field.file_name().map(str::to_string),
                    content_type: field.content_type().map(str::to_string),
                    bytes: field.bytes().await.map_err(bad_form)?.to_vec(),
                };
                if upload.is_empty_selection() {
                    continue;
                }
                // 图片不合格时直接拒绝，不进入评论逻辑
                state.reviews.photos().check(&upload)?;
                photo = Some(upload);
            }
            other => debug!("忽略未知的表单字段: {}", other),
        }
    }

    let review = state
        .reviews
        .submit_review(&product_name, submission, photo)
        .await?;

    Ok(Json(ApiResponse::success(SubmittedReview {
        review,
        message: "Review submitted successfully",
    })))
}

/// 管理用途，不做访问控制
pub async fn delete_review(
    State(state): State<AppState>,
    Path((product_name, review_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Message>>, CoreError> {
    state
        .reviews
        .delete_review(&product_name, &review_id)
        .await?;
    Ok(Json(ApiResponse::success(Message {
        message: "Review deleted successfully",
    })))
}

async fn text(field: Field<'_>) -> Result<String, CoreError> {
    field.text().await.map_err(bad_form)
}

fn bad_form(err: MultipartError) -> CoreError {
    debug!("表单解析失败: {}", err);
    // 超出请求体上限与单张图片超限给出同样的提示
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return CoreError::BadRequest(TOO_LARGE.to_string());
    }
    CoreError::BadRequest(err.body_text())
}
