//! JSON 文档存储
//!
//! 整个文档作为一个单元读写。写入先落到同目录下的临时文件，再 rename 覆盖
//! 目标文件，读者永远看不到写了一半的内容。

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("读写文档 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("文档 {path} 内容损坏: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("序列化文档失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 单个 JSON 文档文件
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时写入 `T::default()`，已存在则什么都不做
    pub async fn ensure_initialized<T>(&self) -> Result<(), StoreError>
    where
        T: Serialize + Default,
    {
        if fs::try_exists(&self.path).await.map_err(|e| self.io(e))? {
            debug!("文档已存在: {}", self.path.display());
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.io(e))?;
        }

        self.save(&T::default()).await?;
        info!("已初始化文档: {}", self.path.display());
        Ok(())
    }

    pub async fn load<T>(&self) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let raw = fs::read(&self.path).await.map_err(|e| self.io(e))?;
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save<T>(&self, document: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let content = serde_json::to_vec_pretty(document)?;
        write_atomic(&self.path, &content)
            .await
            .map_err(|e| self.io(e))
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

async fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let tmp_path = path.with_file_name(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&tmp_path, content).await?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Doc = BTreeMap<String, Vec<u32>>;

    #[tokio::test]
    async fn test_ensure_initialized_writes_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("nested").join("doc.json"));

        store.ensure_initialized::<Doc>().await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[tokio::test]
    async fn test_ensure_initialized_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("doc.json"));

        let mut doc = Doc::new();
        doc.insert("a".into(), vec![1, 2]);
        store.save(&doc).await.unwrap();

        store.ensure_initialized::<Doc>().await.unwrap();
        store.ensure_initialized::<Doc>().await.unwrap();

        assert_eq!(store.load::<Doc>().await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DocumentStore::new(&path).load::<Doc>().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_missing_document_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocumentStore::new(dir.path().join("absent.json"))
            .load::<Doc>()
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("doc.json"));

        store.save(&Doc::new()).await.unwrap();
        store.save(&Doc::new()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["doc.json".to_string()]);
    }
}
