//! # 图片获取模块（acquisition）
//!
//! ## 设计思路
//!
//! 两个输入通道（粘贴事件、文件选择）统一归一化为 [`ImageBlob`]：
//!
//! ```text
//! PasteEvent ── first_image_blob ──┐
//!                                  ├──> ImageBlob ──> scan::ScanService
//! FileInput ── load_selected_file ─┘
//! ```
//!
//! - 粘贴事件中没有图片条目时直接忽略（返回 `None`），不产生任何状态变化。
//! - 文件读取前执行存在性与体积校验，失败时在进入状态机之前返回错误。
//! - 预览（`data:` URI）由 [`preview`] 子模块异步生成。

pub mod preview;
mod source;

use std::path::Path;

use crate::config::ScannerConfig;
use crate::error::{AppError, ScanError};

pub use source::{FileInput, ImageBlob, PasteEvent, PasteItem};

/// 从粘贴事件中挑出第一个带数据的图片条目。
pub fn first_image_blob(event: &PasteEvent) -> Option<ImageBlob> {
    event.items.iter().find_map(|item| {
        if !item.is_image() {
            return None;
        }
        item.data
            .as_ref()
            .map(|data| ImageBlob::new(data.clone(), Some(item.mime.clone()), "paste"))
    })
}

/// 取出粘贴事件中的图片，并执行与文件读取相同的体积上限校验。
pub fn load_pasted(event: &PasteEvent, config: &ScannerConfig) -> Result<Option<ImageBlob>, AppError> {
    let Some(blob) = first_image_blob(event) else {
        return Ok(None);
    };
    ensure_within_size(blob.len() as u64, config)?;
    Ok(Some(blob))
}

fn ensure_within_size(size: u64, config: &ScannerConfig) -> Result<(), AppError> {
    if size > config.max_file_size {
        return Err(AppError::Scan(ScanError::ResourceLimit(format!(
            "图片过大：{:.2} MB（限制：{:.2} MB）",
            size as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        ))));
    }
    Ok(())
}

/// 读取文件选择控件中的文件，并清空控件。
///
/// 控件为空时返回 `Ok(None)`。
pub fn load_selected_file(
    input: &mut FileInput,
    config: &ScannerConfig,
) -> Result<Option<ImageBlob>, AppError> {
    let Some(path) = input.take() else {
        return Ok(None);
    };
    load_from_file(&path, config).map(Some)
}

/// 从本地路径加载图片原始字节。
pub fn load_from_file(path: &Path, config: &ScannerConfig) -> Result<ImageBlob, AppError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

    if !path.exists() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("文件不存在：{}", path.display()),
        )));
    }

    ensure_within_size(std::fs::metadata(path)?.len(), config)?;

    let bytes = std::fs::read(path)?;
    let mime = infer::get(&bytes).map(|kind| kind.mime_type().to_string());
    Ok(ImageBlob::new(bytes, mime, "file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_image_item_after_text() {
        let event = PasteEvent::new(vec![
            PasteItem::new("text/plain", b"hello".to_vec()),
            PasteItem::new("image/png", vec![1u8, 2, 3]),
            PasteItem::new("image/jpeg", vec![9u8]),
        ]);

        let blob = first_image_blob(&event).expect("image item");
        assert_eq!(blob.mime.as_deref(), Some("image/png"));
        assert_eq!(&blob.bytes[..], &[1, 2, 3]);
    }

    #[test]
    fn image_item_without_data_is_skipped() {
        let event = PasteEvent::new(vec![
            PasteItem::without_data("image/png"),
            PasteItem::new("image/gif", vec![7u8]),
        ]);

        let blob = first_image_blob(&event).expect("second image item");
        assert_eq!(blob.mime.as_deref(), Some("image/gif"));
    }

    #[test]
    fn paste_without_image_is_ignored() {
        let event = PasteEvent::new(vec![PasteItem::new("text/plain", b"x".to_vec())]);
        assert!(first_image_blob(&event).is_none());
        assert!(first_image_blob(&PasteEvent::default()).is_none());
    }

    #[test]
    fn file_input_is_cleared_even_when_read_fails() {
        let mut input = FileInput::new();
        input.select("/definitely/not/here.png");

        let result = load_selected_file(&mut input, &ScannerConfig::default());
        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(input.value().is_none());
    }

    #[test]
    fn pasted_image_obeys_size_limit() {
        let config = ScannerConfig::default()
            .with_max_file_size_mb(1)
            .expect("config");
        let at_limit = PasteEvent::new(vec![PasteItem::new("image/png", vec![0u8; 1024 * 1024])]);
        let over = PasteEvent::new(vec![PasteItem::new("image/png", vec![0u8; 1024 * 1024 + 1])]);

        assert!(matches!(load_pasted(&at_limit, &config), Ok(Some(_))));
        assert!(matches!(
            load_pasted(&over, &config),
            Err(AppError::Scan(ScanError::ResourceLimit(_)))
        ));
        assert!(matches!(load_pasted(&PasteEvent::default(), &config), Ok(None)));
    }

    #[test]
    fn oversized_file_is_rejected_before_scanning() {
        let dir = std::env::temp_dir().join(format!("qr-paste-acq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("big.bin");
        std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).expect("write file");

        let config = ScannerConfig::default()
            .with_max_file_size_mb(1)
            .expect("config");
        let result = load_from_file(&path, &config);
        assert!(matches!(
            result,
            Err(AppError::Scan(ScanError::ResourceLimit(_)))
        ));

        let _ = std::fs::remove_dir_all(dir);
    }
}
