//! # 扫描模块（scan）
//!
//! - `state`：扫描状态、请求令牌与只读快照
//! - `machine`：同步状态机（迁移规则 + 令牌栅栏 + 复制反馈代数）
//! - `service`：异步编排（预览、解码、复制反馈定时器、快照发布）
//!
//! ```text
//! acquisition ──> ScanService::accept ──> ScanMachine::begin ──> Scanning
//!                     ├─ preview::generate ──> attach_preview(token)
//!                     └─ extract_pixels + decode_pixels ──> complete(token)
//!                                                   ↓
//!                                       watch::Sender<ScanSnapshot>
//! ```

mod machine;
mod service;
mod state;

pub use machine::ScanMachine;
pub use service::{AcquisitionHandle, ScanService};
pub use state::{RequestToken, ScanSnapshot, ScanState};
