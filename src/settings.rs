//! 应用设置存储
//!
//! # 设计思路
//!
//! 设置以扁平 JSON 对象保存在 `settings.json` 中（键 → 字符串值），
//! 通过 [`KeyValueStore`] 接口读写，便于测试时替换为内存实现。
//!
//! # 实现思路
//!
//! - 文件不存在视为空设置。
//! - 文件损坏时记录警告并视为空设置，启动流程不受影响；下一次写入会覆盖。
//! - 写入前自动创建父目录。

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::AppError;

/// 持久化键值存储。
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// 基于 JSON 文件的设置存储。
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Map<String, Value>, AppError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                log::warn!("⚠️ 设置文件格式无效，按空设置处理: {}", self.path.display());
                Ok(Map::new())
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let map = self.load()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("创建设置目录失败: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| AppError::Storage(format!("序列化设置失败: {}", e)))?;
        fs::write(&self.path, content)?;
        log::debug!("💾 设置已保存: {} = {}", key, value);
        Ok(())
    }
}

/// 进程内存储（测试与无持久化场景）。
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::Storage("内存设置锁已中毒".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AppError::Storage("内存设置锁已中毒".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
