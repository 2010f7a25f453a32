//! 预览生成：把图片字节编码为 `data:` URI。
//!
//! 媒体类型优先使用 blob 声明的类型，其次按内容嗅探，都没有时回退为
//! `application/octet-stream`。

use base64::{Engine as _, engine::general_purpose};

use super::ImageBlob;

const FALLBACK_MIME: &str = "application/octet-stream";

pub fn to_data_uri(blob: &ImageBlob) -> String {
    let mime = blob
        .mime
        .as_deref()
        .filter(|mime| !mime.is_empty())
        .map(str::to_string)
        .or_else(|| infer::get(&blob.bytes).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| FALLBACK_MIME.to_string());

    format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(&blob.bytes)
    )
}

/// 在阻塞线程池中生成预览，避免大图编码占用异步运行时。
pub async fn generate(blob: ImageBlob) -> Option<String> {
    match tokio::task::spawn_blocking(move || to_data_uri(&blob)).await {
        Ok(uri) => Some(uri),
        Err(err) => {
            log::warn!("⚠️ 预览生成任务异常结束: {}", err);
            None
        }
    }
}

/// 从 `data:` URI 中读出媒体类型与 base64 数据长度（终端渲染用）。
pub fn describe(uri: &str) -> Option<(&str, usize)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    Some((mime, (payload.len() / 4 * 3).saturating_sub(padding)))
}
