//! # 输入来源与中间模型
//!
//! - `PasteItem` / `PasteEvent` 表示一次粘贴携带的全部条目
//! - `ImageBlob` 表示已选定、尚未解码的图片字节
//! - `FileInput` 表示文件选择控件（每次选择后清空）

use std::path::PathBuf;

use bytes::Bytes;

/// 粘贴事件中的单个条目。
#[derive(Debug, Clone)]
pub struct PasteItem {
    /// 条目的媒体类型，例如 `text/plain`、`image/png`。
    pub mime: String,
    /// 条目的字节内容；无法取得文件数据时为 `None`。
    pub data: Option<Bytes>,
}

impl PasteItem {
    pub fn new(mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime: mime.into(),
            data: Some(data.into()),
        }
    }

    /// 只有类型、没有可读数据的条目。
    pub fn without_data(mime: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            data: None,
        }
    }

    /// 媒体类型是否表示图片。
    pub fn is_image(&self) -> bool {
        self.mime.to_ascii_lowercase().contains("image")
    }
}

/// 一次粘贴事件。
#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    pub items: Vec<PasteItem>,
}

impl PasteEvent {
    pub fn new(items: Vec<PasteItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 已接收的图片字节。
///
/// `bytes` 使用引用计数缓冲，预览与解码共享同一份数据。
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub bytes: Bytes,
    /// 声明的媒体类型；文件来源时由内容嗅探得到，可能为空。
    pub mime: Option<String>,
    /// 来源提示（用于日志）。
    pub source_hint: &'static str,
}

impl ImageBlob {
    pub fn new(bytes: impl Into<Bytes>, mime: Option<String>, source_hint: &'static str) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
            source_hint,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 文件选择控件。
///
/// 读取后立即清空，保证同一文件可以被再次选择。
#[derive(Debug, Default)]
pub struct FileInput {
    value: Option<PathBuf>,
}

impl FileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, path: impl Into<PathBuf>) {
        self.value = Some(path.into());
    }

    pub fn value(&self) -> Option<&PathBuf> {
        self.value.as_ref()
    }

    /// 取出当前选择并清空控件。
    pub fn take(&mut self) -> Option<PathBuf> {
        self.value.take()
    }
}
