//! 评论数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::core::error::CoreError;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5";

/// 1 到 5 之间的评分，反序列化时校验范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("rating {value} is outside {}..={}", Self::MIN, Self::MAX))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub rating: Rating,
    pub reviewer_name: String,
    pub review_text: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// 全部评论：商品名 → 评论列表（最新的在前）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewDocument(BTreeMap<String, Vec<Review>>);

impl ReviewDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reviews_for(&self, product_name: &str) -> &[Review] {
        self.0.get(product_name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_product(&self, product_name: &str) -> bool {
        self.0.contains_key(product_name)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.0.values().flatten().any(|review| review.id == id)
    }

    /// 插入到商品评论列表的最前面，商品不存在时创建
    pub fn prepend(&mut self, product_name: &str, review: Review) {
        self.0
            .entry(product_name.to_string())
            .or_default()
            .insert(0, review);
    }

    /// 按 id 移除评论；商品仍保留（可能是空列表）
    pub fn remove(&mut self, product_name: &str, review_id: &str) -> Option<Review> {
        let reviews = self.0.get_mut(product_name)?;
        let index = reviews.iter().position(|review| review.id == review_id)?;
        Some(reviews.remove(index))
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 平均评分，没有评论时为 0
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating.value())).sum();
    f64::from(total) / reviews.len() as f64
}

/// 单个商品的评论查询结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReviews {
    pub reviews: Vec<Review>,
    pub average_rating: f64,
}

/// 从表单收集到的原始字段，全部可能缺失
#[derive(Debug, Clone, Default)]
pub struct ReviewSubmission {
    pub rating: Option<String>,
    pub reviewer_name: Option<String>,
    pub review_text: Option<String>,
}

/// 校验通过后的评论输入
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,
    #[validate(length(min = 1))]
    pub reviewer_name: String,
    #[validate(length(min = 1))]
    pub review_text: String,
}

impl NewReview {
    pub fn rating(&self) -> Result<Rating, CoreError> {
        u8::try_from(self.rating)
            .ok()
            .and_then(|value| Rating::try_from(value).ok())
            .ok_or_else(|| CoreError::BadRequest(RATING_OUT_OF_RANGE.to_string()))
    }
}

impl ReviewSubmission {
    /// 必填检查在前，范围检查在后；姓名与正文去掉首尾空白
    pub fn validate(self) -> Result<NewReview, CoreError> {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (Some(rating), Some(reviewer_name), Some(review_text)) = (
            present(self.rating),
            present(self.reviewer_name),
            present(self.review_text),
        ) else {
            return Err(CoreError::BadRequest(MISSING_FIELDS.to_string()));
        };

        let rating = rating
            .parse::<i64>()
            .map_err(|_| CoreError::BadRequest(RATING_OUT_OF_RANGE.to_string()))?;

        let new_review = NewReview {
            rating,
            reviewer_name,
            review_text,
        };

        new_review.validate().map_err(|errors| {
            if errors.field_errors().contains_key("rating") {
                CoreError::BadRequest(RATING_OUT_OF_RANGE.to_string())
            } else {
                CoreError::BadRequest(MISSING_FIELDS.to_string())
            }
        })?;

        Ok(new_review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, rating: u8) -> Review {
        Review {
            id: id.to_string(),
            rating: Rating::try_from(rating).unwrap(),
            reviewer_name: "Ana".to_string(),
            review_text: "Lovely".to_string(),
            date: Utc::now(),
            photo: None,
        }
    }

    fn submission(rating: &str, name: &str, text: &str) -> ReviewSubmission {
        ReviewSubmission {
            rating: Some(rating.to_string()),
            reviewer_name: Some(name.to_string()),
            review_text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_average_rating() {
        let reviews = vec![review("1", 5), review("2", 3), review("3", 4)];
        assert_eq!(average_rating(&reviews), 4.0);
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(1).is_ok());
        assert!(Rating::try_from(5).is_ok());
        assert!(Rating::try_from(6).is_err());
    }

    #[test]
    fn test_review_json_shape() {
        let value = serde_json::to_value(review("42", 4)).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["rating"], 4);
        assert_eq!(value["reviewerName"], "Ana");
        assert_eq!(value["reviewText"], "Lovely");
        assert!(value["photo"].is_null());
    }

    #[test]
    fn test_out_of_range_rating_fails_to_load() {
        let raw = r#"{"Ocean Bloom":[{"id":"1","rating":9,"reviewerName":"a","reviewText":"b","date":"2024-01-01T00:00:00Z","photo":null}]}"#;
        assert!(serde_json::from_str::<ReviewDocument>(raw).is_err());
    }

    #[test]
    fn test_document_prepend_and_remove() {
        let mut doc = ReviewDocument::new();
        doc.prepend("Ocean Bloom", review("1", 5));
        doc.prepend("Ocean Bloom", review("2", 4));

        let ids: Vec<_> = doc.reviews_for("Ocean Bloom").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert!(doc.contains_id("1"));
        assert!(!doc.contains_id("3"));

        assert!(doc.remove("Ocean Bloom", "3").is_none());
        assert_eq!(doc.remove("Ocean Bloom", "1").unwrap().id, "1");
        assert_eq!(doc.len(), 1);
        assert!(doc.remove("Sunset Pearl", "2").is_none());
    }

    #[test]
    fn test_submission_requires_all_fields() {
        let mut missing = submission("4", "Ana", "Nice");
        missing.review_text = None;
        assert_eq!(
            missing.validate(),
            Err(CoreError::BadRequest(MISSING_FIELDS.to_string()))
        );

        assert_eq!(
            submission("4", "   ", "Nice").validate(),
            Err(CoreError::BadRequest(MISSING_FIELDS.to_string()))
        );
        assert_eq!(
            submission("", "Ana", "Nice").validate(),
            Err(CoreError::BadRequest(MISSING_FIELDS.to_string()))
        );
    }

    #[test]
    fn test_submission_rating_range() {
        for bad in ["0", "6", "-1", "abc", "4.5"] {
            assert_eq!(
                submission(bad, "Ana", "Nice").validate(),
                Err(CoreError::BadRequest(RATING_OUT_OF_RANGE.to_string())),
                "rating {bad}"
            );
        }
        assert!(submission("1", "Ana", "Nice").validate().is_ok());
        assert!(submission("5", "Ana", "Nice").validate().is_ok());
    }

    #[test]
    fn test_submission_trims_text() {
        let new_review = submission(" 3 ", "  Ana  ", "\tGreat beads\n").validate().unwrap();
        assert_eq!(new_review.rating, 3);
        assert_eq!(new_review.reviewer_name, "Ana");
        assert_eq!(new_review.review_text, "Great beads");
        assert_eq!(new_review.rating().unwrap().value(), 3);
    }
}
