//! 上传图片数据模型

/// 表单中图片文件字段的名字
pub const PHOTO_FIELD: &str = "photo";

/// 对外暴露图片的 URL 前缀
pub const UPLOADS_ROUTE: &str = "/uploads";

/// 图片超过大小上限时返回给客户端的提示
pub const TOO_LARGE: &str = "File too large";

/// 一次上传的图片，尚未落盘
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// 浏览器在没有选择文件时也会提交一个空的文件字段
    pub fn is_empty_selection(&self) -> bool {
        self.bytes.is_empty() && self.file_name.as_deref().unwrap_or_default().is_empty()
    }

    /// 原文件名的扩展名（带点），只接受字母数字
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}
