//! # 临时对象 URL
//!
//! 解码期间，blob 以 `blob:qr-paste/<id>` 的形式登记在 [`ObjectUrlRegistry`] 中。
//! [`ObjectUrl`] 是 RAII 守卫：无论解码成功还是失败，离开作用域时都会自动注销，
//! 不会残留登记项。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

const URL_PREFIX: &str = "blob:qr-paste/";

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, Bytes>>,
}

/// 对象 URL 登记表，可廉价克隆并在任务间共享。
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    inner: Arc<RegistryInner>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为字节登记一个新的对象 URL。
    pub fn create(&self, bytes: Bytes) -> ObjectUrl {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries().insert(id, bytes);
        log::debug!("🔗 登记对象 URL: {}{}", URL_PREFIX, id);
        ObjectUrl {
            id,
            registry: self.clone(),
        }
    }

    /// 通过 URL 取回字节；已注销或不存在时返回 `None`。
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        let id = url.strip_prefix(URL_PREFIX)?.parse::<u64>().ok()?;
        self.entries().get(&id).cloned()
    }

    /// 当前仍处于登记状态的 URL 数量。
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn revoke(&self, id: u64) {
        if self.entries().remove(&id).is_some() {
            log::debug!("🧹 注销对象 URL: {}{}", URL_PREFIX, id);
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u64, Bytes>> {
        match self.inner.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("对象 URL 登记表锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }
}

/// 对象 URL 守卫，`Drop` 时注销。
#[derive(Debug)]
pub struct ObjectUrl {
    id: u64,
    registry: ObjectUrlRegistry,
}

impl ObjectUrl {
    pub fn as_str(&self) -> String {
        format!("{}{}", URL_PREFIX, self.id)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}
