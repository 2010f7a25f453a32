//! # 解码适配层
//!
//! 外部二维码解码器被视为黑盒，只通过 [`QrDecoder`] 这一窄接口调用：
//! `decode(pixels, width, height) -> Option<String>`。
//! 默认实现 [`RqrrDecoder`] 基于 `rqrr`；测试可以注入返回预设结果的假解码器。

use rqrr::PreparedImage;

use crate::error::ScanError;
use crate::pixels::PixelBuffer;

/// 二维码解码器。
///
/// 单次调用、无内部状态；返回 `None` 表示图片中没有可解码的二维码。
pub trait QrDecoder: Send + Sync {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Option<String>;
}

/// 基于 `rqrr` 的默认解码器。
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Option<String> {
        let (w, h) = (width as usize, height as usize);
        if w == 0 || h == 0 || rgba.len() < w * h * 4 {
            return None;
        }

        let grey = rgba_to_greyscale(rgba, w, h);
        let mut prepared = PreparedImage::prepare_from_greyscale(w, h, |x, y| grey[y * w + x]);
        let grids = prepared.detect_grids();
        log::debug!("🔍 检测到 {} 个候选二维码网格", grids.len());

        grids.iter().find_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(content),
            Err(err) => {
                log::debug!("候选网格解码失败: {:?}", err);
                None
            }
        })
    }
}

/// ITU-R BT.601 亮度，透明像素按白色背景合成。
fn rgba_to_greyscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    rgba.chunks_exact(4)
        .take(width * height)
        .map(|px| {
            let (r, g, b, a) = (px[0] as u32, px[1] as u32, px[2] as u32, px[3] as u32);
            let luma = (77 * r + 150 * g + 29 * b) >> 8;
            ((luma * a + 255 * (255 - a)) / 255) as u8
        })
        .collect()
}

/// 调用解码器并解释结果：有内容即成功，否则为 `NoCodeFound`。
pub fn decode_pixels(decoder: &dyn QrDecoder, pixels: &PixelBuffer) -> Result<String, ScanError> {
    match decoder.decode(&pixels.rgba, pixels.width, pixels.height) {
        Some(payload) => {
            log::info!("✅ 二维码解码成功 - 内容长度: {}", payload.len());
            log::debug!("二维码内容: {}", payload);
            Ok(payload)
        }
        None => {
            log::info!("🚫 未在图片中找到二维码 - 尺寸: {}x{}", pixels.width, pixels.height);
            Err(ScanError::NoCodeFound)
        }
    }
}
