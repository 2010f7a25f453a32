//! # 像素提取模块
//!
//! ## 设计思路
//!
//! 将"字节 → 图像 → RGBA"的过程集中管理，并在完整解码前先按图片头尺寸做像素上限检查，
//! 降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 为 blob 登记临时对象 URL（守卫离开作用域即注销）
//! 2. 通过 URL 取回字节，猜测格式并读取 header 尺寸
//! 3. 按像素上限快速拒绝
//! 4. 完整解码并转换为 RGBA，校验字节长度一致性

mod object_url;

use std::io::Cursor;

use image::{GenericImageView, ImageReader};

use crate::acquisition::ImageBlob;
use crate::config::ScannerConfig;
use crate::error::ScanError;

pub use object_url::{ObjectUrl, ObjectUrlRegistry};

/// 解码后的 RGBA 像素缓冲（行优先）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA 字节数组（`width * height * 4`）。
    pub rgba: Vec<u8>,
}

/// 将 blob 解码为 RGBA 像素缓冲。
pub fn extract_pixels(
    blob: &ImageBlob,
    registry: &ObjectUrlRegistry,
    config: &ScannerConfig,
) -> Result<PixelBuffer, ScanError> {
    let object_url = registry.create(blob.bytes.clone());
    let bytes = registry
        .resolve(&object_url.as_str())
        .ok_or_else(|| ScanError::ImageLoad("对象 URL 已失效".to_string()))?;

    let (header_width, header_height) = inspect_dimensions(&bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| ScanError::ImageLoad(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    validate_pixel_limits(config, width, height)?;

    let rgba = decoded.to_rgba8().into_raw();
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| ScanError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;

    if rgba.len() != expected_len {
        return Err(ScanError::ImageLoad("解码后像素数据长度异常".to_string()));
    }

    log::info!(
        "✅ 图片解码成功 - 来源: {} 尺寸: {}x{}",
        blob.source_hint,
        width,
        height
    );

    Ok(PixelBuffer {
        width,
        height,
        rgba,
    })
}

fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), ScanError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ScanError::ImageLoad(format!("无法识别图片格式：{}", e)))?
        .into_dimensions()
        .map_err(|e| ScanError::ImageLoad(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &ScannerConfig, width: u32, height: u32) -> Result<(), ScanError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ScanError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(ScanError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn extracts_rgba_at_natural_size() {
        let registry = ObjectUrlRegistry::new();
        let blob = ImageBlob::new(png_bytes(3, 2), Some("image/png".into()), "test");

        let pixels = extract_pixels(&blob, &registry, &ScannerConfig::default()).expect("decode");
        assert_eq!((pixels.width, pixels.height), (3, 2));
        assert_eq!(pixels.rgba.len(), 3 * 2 * 4);
        assert_eq!(&pixels.rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn corrupt_bytes_report_image_load_and_release_url() {
        let registry = ObjectUrlRegistry::new();
        let blob = ImageBlob::new(b"definitely not an image".to_vec(), None, "test");

        let result = extract_pixels(&blob, &registry, &ScannerConfig::default());
        assert!(matches!(result, Err(ScanError::ImageLoad(_))));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn truncated_png_is_rejected() {
        let registry = ObjectUrlRegistry::new();
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(bytes.len() / 2);
        let blob = ImageBlob::new(bytes, Some("image/png".into()), "test");

        let result = extract_pixels(&blob, &registry, &ScannerConfig::default());
        assert!(matches!(result, Err(ScanError::ImageLoad(_))));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn pixel_limit_is_enforced_before_decode() {
        let registry = ObjectUrlRegistry::new();
        let blob = ImageBlob::new(png_bytes(20, 20), Some("image/png".into()), "test");
        let config = ScannerConfig {
            max_decoded_pixels: 100,
            ..ScannerConfig::default()
        };

        let result = extract_pixels(&blob, &registry, &config);
        assert!(matches!(result, Err(ScanError::ResourceLimit(_))));
        assert_eq!(registry.live_count(), 0);
    }
}
