//! 核心中间件模块

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

use super::error::ErrorKind;

/// 请求日志中间件
///
/// 评论和库存接口会额外记录商品名；处理器返回错误时记录错误类别。
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let product = product_segment(&path);

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let kind = response.extensions().get::<ErrorKind>().map(|kind| kind.0);

    if status.is_server_error() || status == axum::http::StatusCode::REQUEST_TIMEOUT {
        warn!(
            %method,
            %path,
            product = product.as_deref(),
            status = status.as_u16(),
            elapsed_ms,
            error_kind = kind,
            "请求失败"
        );
    } else if let Some(kind) = kind {
        info!(
            %method,
            %path,
            product = product.as_deref(),
            status = status.as_u16(),
            elapsed_ms,
            error_kind = kind,
            "请求被拒绝"
        );
    } else {
        info!(
            %method,
            %path,
            product = product.as_deref(),
            status = status.as_u16(),
            elapsed_ms,
            "请求完成"
        );
    }

    response
}

/// 从 `/api/reviews/<商品>` 或 `/api/stock/<商品>` 中取出解码后的商品名
fn product_segment(path: &str) -> Option<String> {
    let rest = path
        .strip_prefix("/api/reviews/")
        .or_else(|| path.strip_prefix("/api/stock/"))?;
    let segment = rest.split('/').next().filter(|s| !s.is_empty())?;
    if segment == "refresh" && path.starts_with("/api/stock/") {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_segment() {
        assert_eq!(
            product_segment("/api/reviews/Ocean%20Bloom").as_deref(),
            Some("Ocean Bloom")
        );
        assert_eq!(
            product_segment("/api/reviews/AvoBuds/1700000000000").as_deref(),
            Some("AvoBuds")
        );
        assert_eq!(
            product_segment("/api/stock/Azure%20Dream/decrease").as_deref(),
            Some("Azure Dream")
        );
        assert_eq!(product_segment("/api/stock/refresh"), None);
        assert_eq!(product_segment("/api/reviews"), None);
        assert_eq!(product_segment("/health"), None);
    }

    #[test]
    fn test_invalid_utf8_segment_is_kept() {
        assert_eq!(
            product_segment("/api/reviews/bad%FF").as_deref(),
            Some("bad%FF")
        );
    }
}
