//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 扫描流水线内部的失败（图片损坏、未找到二维码、资源超限）由 [`ScanError`] 表达，
//! 并在发生处直接转换为 `Error` 状态，附带固定的用户可读文案。
//!
//! 进程级失败（剪贴板、文件、设置存储、打开链接）统一为 [`AppError`]，
//! 由调用方（CLI）决定如何呈现。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - `ScanError::user_message` 只返回固定文案，技术细节仅写入日志。
//! - 为 `AppError` 实现 `Serialize`，`--json` 输出时序列化为字符串。

use serde::Serialize;

/// 图片无法解码时展示给用户的文案。
pub const IMAGE_LOAD_MESSAGE: &str = "The image file is corrupted or not supported.";

/// 图片中未检测到二维码时展示给用户的文案。
pub const NO_CODE_FOUND_MESSAGE: &str =
    "No QR code found in this image. Please try with a clearer image.";

/// 图片尺寸超出解码上限时展示给用户的文案。
pub const RESOURCE_LIMIT_MESSAGE: &str = "The image is too large to scan.";

/// 扫描流水线错误。
///
/// 每个分支都会被转换为 `Error` 状态，永远不会作为原始错误抛给界面。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// 图片字节无法被解码（格式不支持或数据损坏）
    #[error("图片解码失败：{0}")]
    ImageLoad(String),

    /// 解码器未在像素中找到二维码
    #[error("未检测到二维码")]
    NoCodeFound,

    /// 图片尺寸或体积超出配置上限
    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl ScanError {
    /// 面向用户的固定文案。
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ImageLoad(_) => IMAGE_LOAD_MESSAGE,
            Self::NoCodeFound => NO_CODE_FOUND_MESSAGE,
            Self::ResourceLimit(_) => RESOURCE_LIMIT_MESSAGE,
        }
    }
}

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 扫描流水线错误（仅在状态机之外使用，例如文件过大被提前拒绝）
    #[error("{0}")]
    Scan(#[from] ScanError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置存储不可用
    #[error("设置存储不可用: {0}")]
    Storage(String),

    /// 打开链接失败
    #[error("打开链接失败: {0}")]
    Open(String),

    /// 调用参数不合法
    #[error("参数错误: {0}")]
    InvalidInput(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
