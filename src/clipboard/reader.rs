//! 系统剪贴板快照 → 粘贴事件。
//!
//! 条目顺序与浏览器粘贴一致：先文本、后图片。剪贴板图片以 RGBA 形式给出，
//! 这里重新编码为 PNG，条目类型为 `image/png`。

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::acquisition::{PasteEvent, PasteItem};
use crate::error::AppError;

/// 剪贴板中的原始图片（RGBA）。
pub struct ClipboardImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// 读取系统剪贴板当前内容。
///
/// 剪贴板为空或只有不支持的格式时返回空事件，由上层按"无图片"忽略。
pub fn read_paste_event() -> Result<PasteEvent, AppError> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| AppError::Clipboard(format!("打开剪贴板失败: {}", e)))?;

    let text = match clipboard.get_text() {
        Ok(text) => Some(text),
        Err(err) => {
            log::trace!("剪贴板中没有文本: {}", err);
            None
        }
    };

    let image = match clipboard.get_image() {
        Ok(data) => Some(ClipboardImage {
            width: data.width,
            height: data.height,
            rgba: data.bytes.into_owned(),
        }),
        Err(err) => {
            log::trace!("剪贴板中没有图片: {}", err);
            None
        }
    };

    paste_event_from_parts(text, image)
}

/// 由剪贴板的文本与图片部分组装粘贴事件。
pub fn paste_event_from_parts(
    text: Option<String>,
    image: Option<ClipboardImage>,
) -> Result<PasteEvent, AppError> {
    let mut items = Vec::new();

    if let Some(text) = text {
        items.push(PasteItem::new("text/plain", text.into_bytes()));
    }

    if let Some(image) = image {
        let png = encode_png(image)?;
        items.push(PasteItem::new("image/png", png));
    }

    Ok(PasteEvent::new(items))
}

fn encode_png(image: ClipboardImage) -> Result<Vec<u8>, AppError> {
    let (width, height) = (image.width as u32, image.height as u32);
    let buffer = RgbaImage::from_raw(width, height, image.rgba)
        .ok_or_else(|| AppError::Clipboard("创建图像缓冲区失败".to_string()))?;

    let mut out = Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| AppError::Clipboard(format!("剪贴板图片编码失败: {}", e)))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::first_image_blob;

    #[test]
    fn text_comes_before_image() {
        let image = ClipboardImage {
            width: 2,
            height: 2,
            rgba: vec![0u8; 16],
        };
        let event = paste_event_from_parts(Some("caption".to_string()), Some(image)).expect("event");

        let mimes: Vec<_> = event.items.iter().map(|item| item.mime.as_str()).collect();
        assert_eq!(mimes, ["text/plain", "image/png"]);

        let blob = first_image_blob(&event).expect("image");
        assert_eq!(image::guess_format(&blob.bytes).ok(), Some(ImageFormat::Png));
    }

    #[test]
    fn mismatched_buffer_is_an_error() {
        let image = ClipboardImage {
            width: 4,
            height: 4,
            rgba: vec![0u8; 3],
        };
        assert!(matches!(
            paste_event_from_parts(None, Some(image)),
            Err(AppError::Clipboard(_))
        ));
    }

    #[test]
    fn empty_clipboard_yields_empty_event() {
        let event = paste_event_from_parts(None, None).expect("event");
        assert!(event.is_empty());
    }
}
