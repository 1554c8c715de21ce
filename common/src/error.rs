//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Frame {index} out of range (frames: {len})")]
    FrameOutOfRange { index: usize, len: usize },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
