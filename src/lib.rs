//! # 本地二维码扫描工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 外壳 (CLI / 剪贴板监听)                  │
//! │                                                          │
//! │   app::App ── Action ──> dispatch      View <── render   │
//! └───────┼──────────────────────────────────────────▲───────┘
//!         ↓                                          │ 快照 (watch)
//! ┌───────┼──────────────────────────────────────────┼───────┐
//! │       ↓               扫描核心                   │       │
//! │                                                          │
//! │  acquisition ── ImageBlob ──> scan::ScanService          │
//! │   (粘贴 / 文件)                 │  ├─ ScanMachine (令牌)  │
//! │                                 │  ├─ preview (data URI)  │
//! │                                 ↓  └─ copy 反馈计时       │
//! │                 pixels (对象 URL RAII) ──> decoder (rqrr) │
//! │                                                          │
//! │  error · config · settings · theme · clipboard · opener │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | `ScanError`（固定的用户提示）与 `AppError` |
//! | [`config`] | 文件体积、像素上限、复制反馈时长、设置文件路径 |
//! | [`settings`] | 键值设置存储（JSON 文件 / 内存） |
//! | [`theme`] | 主题偏好：已保存值 → 系统偏好 → 浅色 |
//! | [`clipboard`] | 写入结果、读取粘贴内容、监听剪贴板变化 |
//! | [`acquisition`] | 粘贴事件 / 文件选择归一化为图片 blob，生成预览 |
//! | [`pixels`] | 图片解码为 RGBA 像素缓冲，临时对象 URL 管理 |
//! | [`decoder`] | 二维码检测与解码 |
//! | [`scan`] | 扫描状态机与异步编排 |
//! | [`presentation`] | 视图模型与终端渲染 |
//! | [`opener`] | 用系统默认程序打开链接 |
//! | [`app`] | 组合以上模块，处理用户操作 |

pub mod error;
pub mod config;
pub mod settings;
pub mod theme;
pub mod clipboard;
pub mod acquisition;
pub mod pixels;
pub mod decoder;
pub mod scan;
pub mod presentation;
pub mod opener;
pub mod app;
