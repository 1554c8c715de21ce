use crate::error::{AnnotatorError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use vehicle_annotator_common::{ImageRecord, ImagesResponse, UploadRequest, UploadResponse};

/// リモート画像ストア
#[async_trait]
pub trait RemoteImageStore: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse>;
    async fn list_images(&self) -> Result<Vec<ImageRecord>>;
}

/// HTTP経由の画像ストア
///
/// - `POST {base}/uploadImage`
/// - `GET {base}/images`
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpImageStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnnotatorError::Config(format!("HTTPクライアント初期化に失敗: {}", e)))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteImageStore for HttpImageStore {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse> {
        let url = self.endpoint("uploadImage");
        debug!(%url, filename = %request.filename, bytes = request.data.len(), "uploading image");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AnnotatorError::RemoteUpload(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnnotatorError::RemoteUpload(e.to_string()))?;

        // エラー時もサーバーは {success:false, message} を返す
        let parsed: Option<UploadResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(upload) if status.is_success() && upload.success => Ok(upload),
            Some(upload) => Err(AnnotatorError::RemoteUpload(
                upload.message.unwrap_or_else(|| format!("HTTP {}", status)),
            )),
            None if status.is_success() => Err(AnnotatorError::RemoteParse(body)),
            None => Err(AnnotatorError::RemoteUpload(format!("HTTP {}", status))),
        }
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let url = self.endpoint("images");
        debug!(%url, "fetching image list");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnnotatorError::RemoteFetch(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnnotatorError::RemoteFetch(e.to_string()))?;

        let parsed: ImagesResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                AnnotatorError::RemoteParse(e.to_string())
            } else {
                AnnotatorError::RemoteFetch(format!("HTTP {}", status))
            }
        })?;

        if !parsed.success {
            return Err(AnnotatorError::RemoteFetch(
                parsed.message.unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }
        Ok(parsed.images)
    }
}
