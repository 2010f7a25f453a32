// 集成测试共用的图片夹具
#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};

const MODULE_PX: u32 = 4;
const QUIET_ZONE: u32 = 4;

/// 把文本编码为二维码并绘制成 PNG。
pub fn qr_png(text: &str) -> Vec<u8> {
    let code = QrCode::new(text.as_bytes()).expect("encode qr");
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let side = (modules + QUIET_ZONE * 2) * MODULE_PX;
    let image = GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / MODULE_PX, y / MODULE_PX);
        if mx < QUIET_ZONE || my < QUIET_ZONE || mx >= QUIET_ZONE + modules || my >= QUIET_ZONE + modules {
            return Luma([255]);
        }
        let index = ((my - QUIET_ZONE) * modules + (mx - QUIET_ZONE)) as usize;
        match colors[index] {
            Color::Dark => Luma([0]),
            Color::Light => Luma([255]),
        }
    });

    encode_png(image)
}

/// 纯白图片：可以解码，但没有二维码。
pub fn blank_png(side: u32) -> Vec<u8> {
    encode_png(GrayImage::from_pixel(side, side, Luma([255])))
}

fn encode_png(image: GrayImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

pub fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("qr-paste-{tag}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
