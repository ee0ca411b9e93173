//! 产品存储基础设施
//!
//! 整个产品集合保存在一个 JSON 数组文档中，每次读取整份文档、每次写回整份文档。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::app::products::model::Product;

/// 存储错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("无法读取产品文档 {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("产品文档 {path} 不是合法的 JSON 数组: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("无法写入产品文档 {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("产品序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// 读取类错误 (文件缺失、内容损坏)
    pub fn is_read(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Parse { .. })
    }
}

/// 产品集合的存储抽象
pub trait ProductStore: Send + Sync {
    /// 读取完整的产品集合
    fn load(&self) -> Result<Vec<Product>, StoreError>;

    /// 用给定集合覆盖存储内容
    fn persist(&self, products: &[Product]) -> Result<(), StoreError>;
}

/// 基于单个 JSON 文件的存储
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文档不存在时创建父目录和一个空数组文档
    pub fn initialize(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        self.persist(&[])
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProductStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Product>, StoreError> {
        let content = fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let products: Vec<Product> =
            serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = products.len(), "产品文档已加载");
        Ok(products)
    }

    fn persist(&self, products: &[Product]) -> Result<(), StoreError> {
        let content = serde_json::to_vec(products)?;

        // 先写临时文件再重命名，读者只会看到完整的旧文档或新文档
        let temp = self.temp_path();
        fs::write(&temp, &content)
            .and_then(|_| fs::rename(&temp, &self.path))
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = products.len(), "产品文档已写入");
        Ok(())
    }
}
