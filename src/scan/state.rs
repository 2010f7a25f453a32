//! 扫描状态与只读快照。

use serde::Serialize;

/// 界面所处的扫描状态，任意时刻只有一个生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    Scanning,
    Success,
    Error,
}

/// 单次获取的请求令牌，单调递增。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(pub(crate) u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// 状态机对外暴露的只读快照。
///
/// `decoded_result` 仅在 `Success` 时存在，`failure_reason` 仅在 `Error` 时存在。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSnapshot {
    pub state: ScanState,
    pub decoded_result: Option<String>,
    pub failure_reason: Option<String>,
    pub preview_image: Option<String>,
    pub copied: bool,
    pub request: Option<RequestToken>,
}

impl Default for ScanSnapshot {
    fn default() -> Self {
        Self {
            state: ScanState::Idle,
            decoded_result: None,
            failure_reason: None,
            preview_image: None,
            copied: false,
            request: None,
        }
    }
}
