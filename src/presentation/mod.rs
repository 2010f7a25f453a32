//! # 展示层
//!
//! 从只读快照构建与状态一一对应的视图模型 [`View`]，再交给 [`render`] 输出到终端，
//! 或在 `--json` 模式下直接序列化。

pub mod render;

use serde::Serialize;

use crate::scan::{ScanSnapshot, ScanState};

pub const IDLE_HEADLINE: &str = "Paste QR code image here";
pub const IDLE_HINT: &str = "Copy an image to the clipboard, or pass an image file";
pub const UPLOAD_LABEL: &str = "Upload QR code";
pub const SCANNING_LABEL: &str = "Scanning...";
pub const RESULT_TITLE: &str = "Scan Result";
pub const COPY_LABEL: &str = "Copy result";
pub const COPIED_LABEL: &str = "Copied";
pub const OPEN_LINK_LABEL: &str = "Open link";
pub const SCAN_AGAIN_LABEL: &str = "Scan new code";
pub const ERROR_TITLE: &str = "An error occurred";
pub const RETRY_LABEL: &str = "Try again";
pub const FOOTER: &str =
    "All processing happens on this machine. Your images are not uploaded to any server.";

/// 判断文本是否为可打开的链接。
///
/// 必须能解析为绝对 URL，且原文以 `http://` 或 `https://` 开头（逐字匹配，
/// 大写协议或前后带空白的文本都不算）。
pub fn is_url(text: &str) -> bool {
    url::Url::parse(text).is_ok() && (text.starts_with("http://") || text.starts_with("https://"))
}

/// 与扫描状态一一对应的视图模型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Idle {
        headline: &'static str,
        hint: &'static str,
        upload_label: &'static str,
    },
    Scanning {
        preview: Option<String>,
        label: &'static str,
    },
    Success {
        title: &'static str,
        payload: String,
        copy_label: &'static str,
        copied: bool,
        open_link: Option<String>,
        reset_label: &'static str,
    },
    Error {
        title: &'static str,
        message: String,
        reset_label: &'static str,
    },
}

impl View {
    pub fn from_snapshot(snapshot: &ScanSnapshot) -> Self {
        match snapshot.state {
            ScanState::Idle => Self::Idle {
                headline: IDLE_HEADLINE,
                hint: IDLE_HINT,
                upload_label: UPLOAD_LABEL,
            },
            ScanState::Scanning => Self::Scanning {
                preview: snapshot.preview_image.clone(),
                label: SCANNING_LABEL,
            },
            ScanState::Success => {
                let payload = snapshot.decoded_result.clone().unwrap_or_default();
                let open_link = is_url(&payload).then(|| payload.clone());
                Self::Success {
                    title: RESULT_TITLE,
                    copy_label: if snapshot.copied { COPIED_LABEL } else { COPY_LABEL },
                    copied: snapshot.copied,
                    open_link,
                    reset_label: SCAN_AGAIN_LABEL,
                    payload,
                }
            }
            ScanState::Error => Self::Error {
                title: ERROR_TITLE,
                message: snapshot.failure_reason.clone().unwrap_or_default(),
                reset_label: RETRY_LABEL,
            },
        }
    }
}

/// 结果区可见部分：最多 `max_lines` 行，其余折叠。
pub fn visible_lines(payload: &str, max_lines: usize) -> (Vec<&str>, usize) {
    let lines: Vec<&str> = payload.lines().collect();
    if lines.len() <= max_lines {
        return (lines, 0);
    }
    let hidden = lines.len() - max_lines;
    (lines[..max_lines].to_vec(), hidden)
}
