//! 剪贴板管理模块
//!
//! # 设计思路
//!
//! - **写入**：复制结果通过 [`TextClipboard`] 接口写入，默认实现基于 `arboard`，
//!   测试可以注入记录型实现。
//! - **读取**：[`reader`] 把系统剪贴板当前内容转换为一次粘贴事件。
//! - **监控**：[`listener`] 监听系统剪贴板变化（`clipboard-master`）。
//! - **忽略标志 + RAII Guard**：本进程写入剪贴板时设置标志，监听器消费后跳过该次变化，
//!   避免把自己复制的结果当成新的粘贴。

pub mod listener;
pub mod reader;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AppError;

pub use listener::{ClipboardChange, start_monitoring};
pub use reader::read_paste_event;

/// 全局标志：忽略下一次剪贴板变化事件
static IGNORE_NEXT_CLIPBOARD_CHANGE: AtomicBool = AtomicBool::new(false);

pub fn set_ignore_flag() {
    IGNORE_NEXT_CLIPBOARD_CHANGE.store(true, Ordering::SeqCst);
    log::debug!("🚫 已设置剪贴板忽略标志 - 下一次剪贴板变化将被忽略");
}

/// 读取并清除忽略标志。
pub(crate) fn consume_ignore_flag() -> bool {
    IGNORE_NEXT_CLIPBOARD_CHANGE.swap(false, Ordering::SeqCst)
}

/// 剪贴板忽略标志的 RAII 守卫
///
/// 构造时设置忽略标志；标志由监听器消费后自动清除。
///
/// ```rust,no_run
/// use qr_paste::clipboard;
///
/// fn write_to_clipboard() {
///     let _guard = clipboard::IgnoreGuard::new();
///     // ... 写入剪贴板 ...
/// }
/// ```
pub struct IgnoreGuard;

impl IgnoreGuard {
    pub fn new() -> Self {
        set_ignore_flag();
        Self
    }
}

impl Default for IgnoreGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// 纯文本剪贴板写入接口。
pub trait TextClipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), AppError>;
}

/// 基于 `arboard` 的系统剪贴板。
///
/// 句柄在首次写入时创建并在进程内保持存活：部分平台（X11/Wayland）上
/// 剪贴板内容由持有句柄的进程提供，句柄释放后内容随之消失。
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextClipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), AppError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| AppError::Clipboard("剪贴板句柄锁已中毒".to_string()))?;

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| AppError::Clipboard(format!("打开剪贴板失败: {}", e)))?;
            *guard = Some(clipboard);
        }

        let clipboard = guard
            .as_mut()
            .ok_or_else(|| AppError::Clipboard("剪贴板句柄不可用".to_string()))?;

        let _ignore = IgnoreGuard::new();
        clipboard.set_text(text.to_owned()).map_err(|e| {
            // 写入失败不会产生变化事件，标志需要撤回
            consume_ignore_flag();
            AppError::Clipboard(format!("写入文本失败: {}", e))
        })
    }
}
