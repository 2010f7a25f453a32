//! # 扫描状态机
//!
//! ```text
//!            begin                complete(Ok)
//!   Idle ───────────> Scanning ───────────────> Success
//!    ^                 │  ^  complete(Err)         │
//!    │                 │  └──────────> Error       │
//!    │                 │     begin       │         │
//!    └──── reset ──────┴─────────────────┴─────────┘
//! ```
//!
//! - 结果文本与失败原因分别放在 `Success` / `Error` 分支内，"结果存在当且仅当成功"
//!   由类型保证。
//! - 每次 `begin` 生成新的请求令牌；`complete` / `attach_preview` 只接受当前令牌，
//!   过期任务的回调被静默丢弃。
//! - 复制反馈使用代数（generation）计数，延迟清除时代数不一致即视为过期。

use crate::error::ScanError;

use super::state::{RequestToken, ScanSnapshot, ScanState};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Scanning,
    Success(String),
    Error(String),
}

#[derive(Debug)]
pub struct ScanMachine {
    phase: Phase,
    preview: Option<String>,
    copied: bool,
    copy_generation: u64,
    current: Option<RequestToken>,
    next_token: u64,
}

impl Default for ScanMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            preview: None,
            copied: false,
            copy_generation: 0,
            current: None,
            next_token: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        match self.phase {
            Phase::Idle => ScanState::Idle,
            Phase::Scanning => ScanState::Scanning,
            Phase::Success(_) => ScanState::Success,
            Phase::Error(_) => ScanState::Error,
        }
    }

    /// 当前成功解码的内容。
    pub fn payload(&self) -> Option<&str> {
        match &self.phase {
            Phase::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn current_request(&self) -> Option<RequestToken> {
        self.current
    }

    /// 接收一次新的获取：进入 `Scanning` 并清空上一轮的全部瞬态字段。
    pub fn begin(&mut self) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);

        if let Some(previous) = self.current {
            if self.phase == Phase::Scanning {
                log::debug!("⏭️ 请求 #{} 被 #{} 取代", previous.0, token.0);
            }
        }

        self.phase = Phase::Scanning;
        self.preview = None;
        self.clear_copied();
        self.current = Some(token);
        token
    }

    /// 应用解码结果；令牌过期或状态不是 `Scanning` 时忽略并返回 `false`。
    pub fn complete(&mut self, token: RequestToken, outcome: Result<String, ScanError>) -> bool {
        if self.current != Some(token) || self.phase != Phase::Scanning {
            log::debug!("🗑️ 丢弃过期的解码结果 - 请求 #{}", token.0);
            return false;
        }

        self.phase = match outcome {
            Ok(payload) => Phase::Success(payload),
            Err(err) => {
                log::info!("❌ 扫描失败 - 请求 #{}: {}", token.0, err);
                Phase::Error(err.user_message().to_string())
            }
        };
        true
    }

    /// 挂载预览；只要令牌仍是当前请求即可（预览可能晚于解码完成）。
    pub fn attach_preview(&mut self, token: RequestToken, uri: String) -> bool {
        if self.current != Some(token) {
            log::debug!("🗑️ 丢弃过期的预览 - 请求 #{}", token.0);
            return false;
        }
        self.preview = Some(uri);
        true
    }

    /// 回到 `Idle` 并清空所有瞬态字段；进行中的请求随之失效。
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.preview = None;
        self.clear_copied();
        self.current = None;
    }

    /// 标记已复制，返回本次复制的代数。
    ///
    /// 令牌不是当前请求或状态不是 `Success` 时返回 `None`。
    pub fn mark_copied(&mut self, token: RequestToken) -> Option<u64> {
        if self.current != Some(token) || !matches!(self.phase, Phase::Success(_)) {
            return None;
        }
        self.copy_generation += 1;
        self.copied = true;
        Some(self.copy_generation)
    }

    /// 延迟清除复制反馈；代数已变化时返回 `false`。
    pub fn clear_copy_feedback(&mut self, generation: u64) -> bool {
        if generation != self.copy_generation || !self.copied {
            return false;
        }
        self.copied = false;
        true
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        let (decoded_result, failure_reason) = match &self.phase {
            Phase::Success(payload) => (Some(payload.clone()), None),
            Phase::Error(reason) => (None, Some(reason.clone())),
            Phase::Idle | Phase::Scanning => (None, None),
        };

        ScanSnapshot {
            state: self.state(),
            decoded_result,
            failure_reason,
            preview_image: self.preview.clone(),
            copied: self.copied,
            request: self.current,
        }
    }

    fn clear_copied(&mut self) {
        self.copy_generation += 1;
        self.copied = false;
    }
}
