//! # 剪贴板监听
//!
//! ```text
//! clipboard-master 线程 ──raw──> settle 任务 ──> 调用方通道
//!   (过滤本进程写入)            (静默 80ms 后发出最后一次)
//! ```
//!
//! - 本进程主动写入（复制结果）引起的变化由忽略标志过滤。
//! - 连续变化合并为一次，发出的是最后一次变化，不会漏掉最终内容。
//! - 监听线程异常退出后按指数退避重启；下游通道关闭时整条链路停止。

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use clipboard_master::{CallbackResult, ClipboardHandler, Master};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::consume_ignore_flag;

const SETTLE_INTERVAL_MS: u64 = 80;
const RESTART_BASE_DELAY_MS: u64 = 100;
const RESTART_MAX_DELAY_MS: u64 = 5_000;

/// 一次外部剪贴板变化通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardChange {
    pub at: Instant,
}

fn restart_backoff(attempt: u32) -> Duration {
    let factor = 1_u64 << attempt.saturating_sub(1).min(6);
    Duration::from_millis(RESTART_BASE_DELAY_MS.saturating_mul(factor).min(RESTART_MAX_DELAY_MS))
}

struct Forwarder {
    raw: UnboundedSender<ClipboardChange>,
}

impl ClipboardHandler for Forwarder {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        if consume_ignore_flag() {
            log::debug!("⏭️ 忽略本进程写入引起的剪贴板变化");
            return CallbackResult::Next;
        }

        match self.raw.send(ClipboardChange { at: Instant::now() }) {
            Ok(()) => CallbackResult::Next,
            Err(_) => CallbackResult::Stop,
        }
    }

    fn on_clipboard_error(&mut self, error: std::io::Error) -> CallbackResult {
        log::warn!("📋 剪贴板监听出错: {}", error);
        CallbackResult::Next
    }
}

/// 合并短时间内的连续变化：最后一次变化之后静默 `quiet` 才向下游发出。
///
/// 上游关闭时，尚未发出的变化会先被补发。
pub async fn settle(
    mut raw: UnboundedReceiver<ClipboardChange>,
    out: UnboundedSender<ClipboardChange>,
    quiet: Duration,
) {
    while let Some(mut latest) = raw.recv().await {
        let mut upstream_closed = false;
        loop {
            match tokio::time::timeout(quiet, raw.recv()).await {
                Ok(Some(next)) => latest = next,
                Ok(None) => {
                    upstream_closed = true;
                    break;
                }
                Err(_) => break,
            }
        }

        if out.send(latest).is_err() || upstream_closed {
            return;
        }
    }
}

fn spawn_master(raw: UnboundedSender<ClipboardChange>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut attempt: u32 = 0;
        while !raw.is_closed() {
            match Master::new(Forwarder { raw: raw.clone() }) {
                Ok(mut master) => {
                    attempt = 0;
                    log::info!("📋 剪贴板监听已启动");
                    if let Err(err) = master.run() {
                        log::warn!("📋 剪贴板监听异常退出: {}", err);
                    }
                    if raw.is_closed() {
                        break;
                    }
                }
                Err(err) => log::error!("📋 创建剪贴板监听失败: {}", err),
            }

            attempt = attempt.saturating_add(1);
            let delay = restart_backoff(attempt);
            log::warn!("📋 {}ms 后重启剪贴板监听（第 {} 次）", delay.as_millis(), attempt);
            thread::sleep(delay);
        }
        log::info!("📋 剪贴板监听已停止");
    })
}

/// 启动剪贴板监控，合并后的变化发送到 `tx`。
///
/// 需要在 tokio 运行时内调用；`tx` 的接收端关闭后监听线程随之结束。
pub fn start_monitoring(tx: UnboundedSender<ClipboardChange>) -> JoinHandle<()> {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    tokio::spawn(settle(raw_rx, tx, Duration::from_millis(SETTLE_INTERVAL_MS)));
    spawn_master(raw_tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(offset_ms: u64) -> ClipboardChange {
        ClipboardChange {
            at: Instant::now() + Duration::from_millis(offset_ms),
        }
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(restart_backoff(1), Duration::from_millis(100));
        assert_eq!(restart_backoff(2), Duration::from_millis(200));
        assert_eq!(restart_backoff(3), Duration::from_millis(400));
        assert_eq!(restart_backoff(7), Duration::from_millis(5_000));
        assert_eq!(restart_backoff(40), Duration::from_millis(5_000));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_last_change() {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(settle(raw_rx, out_tx, Duration::from_millis(80)));

        let last = change(3_000);
        raw_tx.send(change(1_000)).expect("send");
        tokio::time::sleep(Duration::from_millis(30)).await;
        raw_tx.send(change(2_000)).expect("send");
        tokio::time::sleep(Duration::from_millis(30)).await;
        raw_tx.send(last).expect("send");

        assert_eq!(out_rx.recv().await, Some(last));
        assert!(out_rx.try_recv().is_err());

        let later = change(9_000);
        tokio::time::sleep(Duration::from_millis(200)).await;
        raw_tx.send(later).expect("send");
        assert_eq!(out_rx.recv().await, Some(later));

        drop(raw_tx);
        task.await.expect("settle task");
        assert_eq!(out_rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_change_is_flushed_when_upstream_closes() {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();

        let only = change(0);
        raw_tx.send(only).expect("send");
        drop(raw_tx);

        settle(raw_rx, out_tx, Duration::from_millis(80)).await;
        assert_eq!(out_rx.recv().await, Some(only));
        assert_eq!(out_rx.recv().await, None);
    }

    #[tokio::test]
    async fn stops_when_downstream_is_gone() {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        drop(out_rx);

        raw_tx.send(change(0)).expect("send");
        settle(raw_rx, out_tx, Duration::from_millis(1)).await;
        assert!(raw_tx.is_closed());
    }
}
