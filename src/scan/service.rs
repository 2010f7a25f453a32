//! # 扫描服务（可注入状态）
//!
//! ## 设计思路
//!
//! `ScanService` 独占状态机，解码器与剪贴板在构造时注入，而不是运行时全局查找。
//! 界面层只通过 [`ScanService::subscribe`] 拿到只读快照，通过动作方法驱动状态变化。
//!
//! ## 实现思路
//!
//! - 状态机放在 `Mutex` 中，每次迁移都是一个短临界区，迁移天然串行。
//! - 解码在 `spawn_blocking` 中执行，预览在独立任务中生成，二者并发。
//! - 所有异步回调都携带请求令牌，由状态机决定是否采纳。
//! - 每次迁移后通过 `watch` 通道发布快照（仅在内容变化时通知）。

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::acquisition::{self, FileInput, ImageBlob, PasteEvent, preview};
use crate::clipboard::TextClipboard;
use crate::config::ScannerConfig;
use crate::decoder::{QrDecoder, decode_pixels};
use crate::error::{AppError, ScanError};
use crate::opener::LinkOpener;
use crate::pixels::{ObjectUrlRegistry, extract_pixels};
use crate::presentation::is_url;

use super::machine::ScanMachine;
use super::state::{RequestToken, ScanSnapshot};

struct ServiceInner {
    machine: Mutex<ScanMachine>,
    decoder: Arc<dyn QrDecoder>,
    clipboard: Arc<dyn TextClipboard>,
    registry: ObjectUrlRegistry,
    config: ScannerConfig,
    snapshots: watch::Sender<ScanSnapshot>,
}

impl ServiceInner {
    fn machine(&self) -> MutexGuard<'_, ScanMachine> {
        match self.machine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("扫描状态锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    /// 在临界区内执行一次迁移，并发布新的快照。
    fn update<R>(&self, apply: impl FnOnce(&mut ScanMachine) -> R) -> R {
        let (result, next) = {
            let mut machine = self.machine();
            let result = apply(&mut machine);
            (result, machine.snapshot())
        };

        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        result
    }
}

/// 一次已接收获取的后台任务句柄。
pub struct AcquisitionHandle {
    token: RequestToken,
    decode: JoinHandle<()>,
    preview: JoinHandle<()>,
}

impl AcquisitionHandle {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// 等待解码与预览任务全部结束。
    pub async fn finished(self) {
        if let Err(err) = self.decode.await {
            log::warn!("⚠️ 解码任务异常结束 - 请求 #{}: {}", self.token.value(), err);
        }
        if let Err(err) = self.preview.await {
            log::warn!("⚠️ 预览任务异常结束 - 请求 #{}: {}", self.token.value(), err);
        }
    }
}

/// 扫描服务，可廉价克隆。
#[derive(Clone)]
pub struct ScanService {
    inner: Arc<ServiceInner>,
}

impl ScanService {
    pub fn new(
        config: ScannerConfig,
        decoder: Arc<dyn QrDecoder>,
        clipboard: Arc<dyn TextClipboard>,
    ) -> Self {
        let machine = ScanMachine::new();
        let (snapshots, _) = watch::channel(machine.snapshot());
        Self {
            inner: Arc::new(ServiceInner {
                machine: Mutex::new(machine),
                decoder,
                clipboard,
                registry: ObjectUrlRegistry::new(),
                config,
                snapshots,
            }),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.inner.config
    }

    pub fn object_urls(&self) -> &ObjectUrlRegistry {
        &self.inner.registry
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.inner.machine().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// 处理粘贴事件；没有图片条目时忽略并返回 `Ok(None)`。
    ///
    /// 图片超过体积上限时返回错误，状态不变。需要在 tokio 运行时内调用。
    pub fn handle_paste(&self, event: &PasteEvent) -> Result<Option<AcquisitionHandle>, AppError> {
        match acquisition::load_pasted(event, &self.inner.config)? {
            Some(blob) => Ok(Some(self.accept(blob))),
            None => {
                log::debug!("⏭️ 粘贴内容中没有图片（{} 个条目），忽略", event.items.len());
                Ok(None)
            }
        }
    }

    /// 处理文件选择；读取后控件被清空。
    ///
    /// 文件不存在、不可读或体积超限时返回错误，状态不变。
    pub fn handle_file_selected(
        &self,
        input: &mut FileInput,
    ) -> Result<Option<AcquisitionHandle>, AppError> {
        let blob = acquisition::load_selected_file(input, &self.inner.config)?;
        Ok(blob.map(|blob| self.accept(blob)))
    }

    /// 接收一个 blob：立即进入 `Scanning`，随后并发生成预览与解码。
    pub fn accept(&self, blob: ImageBlob) -> AcquisitionHandle {
        let token = self.inner.update(|machine| machine.begin());
        log::info!(
            "📥 接收图片 - 请求 #{} 来源: {} 大小: {} 字节",
            token.value(),
            blob.source_hint,
            blob.len()
        );

        let preview = {
            let inner = Arc::clone(&self.inner);
            let blob = blob.clone();
            tokio::spawn(async move {
                if let Some(uri) = preview::generate(blob).await {
                    inner.update(|machine| machine.attach_preview(token, uri));
                }
            })
        };

        let decode = {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let worker = Arc::clone(&inner);
                let outcome = tokio::task::spawn_blocking(move || {
                    let pixels = extract_pixels(&blob, &worker.registry, &worker.config)?;
                    decode_pixels(worker.decoder.as_ref(), &pixels)
                })
                .await
                .unwrap_or_else(|err| {
                    Err(ScanError::ImageLoad(format!("解码任务异常结束：{}", err)))
                });

                inner.update(|machine| machine.complete(token, outcome));
            })
        };

        AcquisitionHandle {
            token,
            decode,
            preview,
        }
    }

    /// 复制当前结果到剪贴板，并开启复制反馈窗口。
    ///
    /// 非 `Success` 状态下不做任何事，返回 `Ok(false)`。
    pub fn copy_result(&self) -> Result<bool, AppError> {
        let current = {
            let machine = self.inner.machine();
            machine.payload().map(str::to_string).zip(machine.current_request())
        };
        let Some((payload, token)) = current else {
            return Ok(false);
        };

        self.inner.clipboard.write_text(&payload)?;

        let Some(generation) = self.inner.update(|machine| machine.mark_copied(token)) else {
            log::warn!("⚠️ 复制期间扫描状态已变化 - 请求 #{}，不显示复制反馈", token.value());
            return Ok(false);
        };
        log::info!("📋 已复制扫描结果（{} 字符）", payload.chars().count());

        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.copy_feedback;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.update(|machine| machine.clear_copy_feedback(generation));
        });

        Ok(true)
    }

    /// 用系统默认程序打开结果链接；结果不是 http(s) 链接时返回 `Ok(false)`。
    pub fn open_link(&self, opener: &dyn LinkOpener) -> Result<bool, AppError> {
        let Some(payload) = self.inner.machine().payload().map(str::to_string) else {
            return Ok(false);
        };
        if !is_url(&payload) {
            log::debug!("⏭️ 扫描结果不是链接，忽略打开请求");
            return Ok(false);
        }

        opener.open(&payload)?;
        Ok(true)
    }

    pub fn reset(&self) {
        self.inner.update(|machine| machine.reset());
        log::info!("🔄 已重置扫描状态");
    }
}
