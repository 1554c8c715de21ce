//! Data URL ⇔ バイト列

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const JPEG_MIME: &str = "image/jpeg";

/// バイト列からData URLを作成
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Data URLからBase64データ部分を抽出
///
/// "data:" で始まらない場合は素のBase64とみなしてそのまま返す。
pub fn base64_payload(data: &str) -> Result<&str> {
    let trimmed = data.trim();
    if !trimmed.starts_with("data:") {
        return Ok(trimmed);
    }
    let (header, payload) = trimmed
        .split_once(',')
        .ok_or_else(|| Error::DataUrl("missing ',' separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(Error::DataUrl(format!("not base64 encoded: {}", header)));
    }
    Ok(payload)
}

/// MIMEタイプを抽出。ヘッダなしは image/jpeg とみなす
pub fn mime_type(data: &str) -> &str {
    data.trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|mime| !mime.is_empty())
        .unwrap_or(JPEG_MIME)
}

/// Data URL（またはヘッダなしBase64）をデコード
pub fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let payload = base64_payload(data)?;
    Ok(STANDARD.decode(payload)?)
}

/// MIMEタイプに対応する拡張子
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}
