//! 评论图片的存储与清理

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{PhotoUpload, UPLOADS_ROUTE};

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("File too large")]
    TooLarge { size: usize, limit: usize },
    #[error("Only image files are allowed!")]
    NotAnImage(String),
    #[error("图片文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> Result<(), PhotoError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// 大小与 MIME 类型检查，在任何评论逻辑之前执行
    pub fn check(&self, upload: &PhotoUpload) -> Result<(), PhotoError> {
        if upload.bytes.len() > self.max_bytes {
            return Err(PhotoError::TooLarge {
                size: upload.bytes.len(),
                limit: self.max_bytes,
            });
        }

        let content_type = upload.content_type.as_deref().unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(PhotoError::NotAnImage(content_type.to_string()));
        }

        Ok(())
    }

    /// 以新文件名保存图片，返回可以写进评论的引用路径
    pub async fn save(&self, upload: &PhotoUpload) -> Result<String, PhotoError> {
        self.check(upload)?;
        self.ensure_dir().await?;

        let file_name = unique_file_name(&upload.extension());
        fs::write(self.dir.join(&file_name), &upload.bytes).await?;

        info!("已保存评论图片 {} ({} 字节)", file_name, upload.bytes.len());
        Ok(format!("{UPLOADS_ROUTE}/{file_name}"))
    }

    /// 把引用路径还原成上传目录下的文件路径，只取最后一段文件名
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let file_name = reference.rsplit('/').next()?;
        if file_name.is_empty() || file_name == "." || file_name == ".." || file_name.contains('\\')
        {
            return None;
        }
        Some(self.dir.join(file_name))
    }

    /// 删除引用对应的文件，文件已不存在时视为成功
    pub async fn remove(&self, reference: &str) -> Result<(), PhotoError> {
        let Some(path) = self.resolve(reference) else {
            debug!("无法解析的图片引用: {}", reference);
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("已删除评论图片 {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("图片文件已不存在: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn unique_file_name(extension: &str) -> String {
    let random = Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("photo-{}-{}{}", Utc::now().timestamp_millis(), random, extension)
}
