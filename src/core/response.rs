//! 核心响应处理模块

use serde::Serialize;

/// API 响应结构
///
/// `data` 的字段会被平铺到顶层，例如 `{"success": true, "reviews": [...]}`。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// 只带提示信息的响应体
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flattens_payload() {
        let body = serde_json::to_value(ApiResponse::success(Message { message: "ok" })).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "ok" }));
    }
}
