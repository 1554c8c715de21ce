//! 画像ストアAPIの型定義
//!
//! - POST /uploadImage: UploadRequest → UploadResponse
//! - GET /images: ImagesResponse

use serde::{Deserialize, Serialize};

/// アップロード要求（dataはData URLまたは素のBase64）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub message: Option<String>,
}

/// ストアに保存された画像
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRecord {
    pub filename: String,
    pub data: String,
    /// ISO 8601 文字列
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesResponse {
    pub success: bool,
    pub images: Vec<ImageRecord>,
    pub message: Option<String>,
}
