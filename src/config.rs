//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有"可调策略"集中到 `ScannerConfig`：读取体积上限、解码像素上限、
//! 复制反馈时长与结果区可见行数。`Default` 提供生产可用的默认值，
//! CLI 参数在此基础上覆盖。

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const APP_DIR_NAME: &str = "qr-paste";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// 扫描器配置。
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// 粘贴或读取的图片允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码前按图片头尺寸校验的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 复制成功后"已复制"提示的持续时间。
    pub copy_feedback: Duration,
    /// 结果区最多展示的行数，超出部分折叠。
    pub max_visible_lines: usize,
    /// 设置文件路径；`None` 时使用用户数据目录。
    pub settings_path: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            copy_feedback: Duration::from_millis(2000),
            max_visible_lines: 12,
            settings_path: None,
        }
    }
}

impl ScannerConfig {
    /// 以 MB 为单位设置文件体积上限。
    pub fn with_max_file_size_mb(mut self, megabytes: u64) -> Result<Self, AppError> {
        if megabytes == 0 {
            return Err(AppError::InvalidInput("max_file_size 不能为 0".to_string()));
        }
        self.max_file_size = megabytes.saturating_mul(1024 * 1024);
        Ok(self)
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// 解析设置文件路径：优先显式配置，否则回退到 `<data_dir>/qr-paste/settings.json`。
    pub fn resolve_settings_path(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = &self.settings_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::Storage("无法定位用户数据目录".to_string()))?;
        Ok(data_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_copy_feedback_is_two_seconds() {
        assert_eq!(ScannerConfig::default().copy_feedback, Duration::from_millis(2000));
    }

    #[test]
    fn zero_file_size_is_rejected() {
        let result = ScannerConfig::default().with_max_file_size_mb(0);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn explicit_settings_path_wins() {
        let config = ScannerConfig::default().with_settings_path("/tmp/qr-paste-test.json");
        let path = config.resolve_settings_path().expect("resolve");
        assert_eq!(path, PathBuf::from("/tmp/qr-paste-test.json"));
    }
}
