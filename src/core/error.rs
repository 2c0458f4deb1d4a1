//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::app::photos::PhotoError;

/// 核心错误类型
///
/// 所有处理器都返回 `Result<_, CoreError>`，出错时统一渲染为
/// `{"success": false, "error": "..."}`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// 输入缺失或非法 (400)
    BadRequest(String),
    /// 未知商品或评论 (404)
    NotFound(String),
    /// 文档读写失败等存储错误 (500)
    InternalServerError(String),
    /// 处理超过配置的超时时间 (408)
    Timeout,
}

/// 错误类别，随错误响应放进扩展里供请求日志使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorKind(pub &'static str);

/// 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CoreError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CoreError::BadRequest(msg)
            | CoreError::NotFound(msg)
            | CoreError::InternalServerError(msg) => msg,
            CoreError::Timeout => "Request timed out",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::BadRequest(_) => ErrorKind("validation"),
            CoreError::NotFound(_) => ErrorKind("not_found"),
            CoreError::InternalServerError(_) => ErrorKind("storage"),
            CoreError::Timeout => ErrorKind("timeout"),
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for CoreError {}

impl From<PhotoError> for CoreError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::TooLarge { .. } | PhotoError::NotAnImage(_) => {
                warn!("拒绝上传的图片: {}", err);
                CoreError::BadRequest(err.to_string())
            }
            PhotoError::Io(_) => CoreError::InternalServerError("Failed to store photo".to_string()),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_response = ErrorResponse {
            success: false,
            error: self.message().to_string(),
        };

        let mut response = (status, Json(error_response)).into_response();
        response.extensions_mut().insert(self.kind());
        response
    }
}
