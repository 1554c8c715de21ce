//! 合成画像の保存
//!
//! ローカル保存を先に行い、結果に関係なくリモートへ1回だけアップロードする。
//! ローカルが成功していればリモート失敗は部分成功として扱う。

mod remote;

pub use remote::{HttpImageStore, RemoteImageStore};

use crate::error::{AnnotatorError, Result};
use crate::platform::{LocalSave, PlatformAdapter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use vehicle_annotator_common::data_url::{encode_data_url, JPEG_MIME};
use vehicle_annotator_common::UploadRequest;

pub const FILE_NAME_PREFIX: &str = "bilbillede_";

/// 保存ファイル名（ミリ秒タイムスタンプ）
pub fn file_name_for(timestamp_ms: i64) -> String {
    format!("{}{}.jpg", FILE_NAME_PREFIX, timestamp_ms)
}

pub fn timestamped_file_name() -> String {
    file_name_for(chrono::Utc::now().timestamp_millis())
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocalOutcome {
    Saved(LocalSave),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    Uploaded { id: Option<String> },
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// ローカル・リモートとも成功
    Complete,
    /// ローカルのみ成功（部分成功）
    LocalOnly,
    /// リモートのみ成功
    RemoteOnly,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub file_name: String,
    pub local: LocalOutcome,
    pub remote: RemoteOutcome,
}

impl SaveReport {
    pub fn status(&self) -> SaveStatus {
        match (&self.local, &self.remote) {
            (LocalOutcome::Saved(_), RemoteOutcome::Uploaded { .. }) => SaveStatus::Complete,
            (LocalOutcome::Saved(_), RemoteOutcome::Failed(_)) => SaveStatus::LocalOnly,
            (LocalOutcome::Failed(_), RemoteOutcome::Uploaded { .. }) => SaveStatus::RemoteOnly,
            (LocalOutcome::Failed(_), RemoteOutcome::Failed(_)) => SaveStatus::Failed,
        }
    }

    pub fn local_succeeded(&self) -> bool {
        matches!(self.local, LocalOutcome::Saved(_))
    }

    /// 利用者向けメッセージ
    pub fn user_message(&self) -> String {
        match self.status() {
            SaveStatus::Complete => format!("保存・アップロード完了: {}", self.file_name),
            SaveStatus::LocalOnly => format!(
                "ローカルにのみ保存しました (saved locally only): {}",
                self.file_name
            ),
            SaveStatus::RemoteOnly => format!(
                "アップロードのみ完了しました。ローカル保存に失敗: {}",
                self.file_name
            ),
            SaveStatus::Failed => format!("保存に失敗しました: {}", self.file_name),
        }
    }
}

/// 実行中フラグを戻すガード
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncClient {
    platform: Arc<dyn PlatformAdapter>,
    remote: Arc<dyn RemoteImageStore>,
    in_flight: AtomicBool,
}

impl SyncClient {
    pub fn new(platform: Arc<dyn PlatformAdapter>, remote: Arc<dyn RemoteImageStore>) -> Self {
        Self { platform, remote, in_flight: AtomicBool::new(false) }
    }

    pub fn platform(&self) -> &dyn PlatformAdapter {
        self.platform.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// JPEGを保存する
    ///
    /// 保存中に再度呼ばれた場合のみ `SaveInProgress` を返す。
    /// ローカル・リモートの失敗は `SaveReport` に記録される。
    pub async fn save(&self, file_name: &str, jpeg: &[u8]) -> Result<SaveReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AnnotatorError::SaveInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        let data_url = encode_data_url(JPEG_MIME, jpeg);

        let local = match self.platform.save_local(file_name, &data_url) {
            Ok(saved) => {
                info!(file_name, adapter = self.platform.name(), "local save succeeded");
                LocalOutcome::Saved(saved)
            }
            Err(err) => {
                warn!(file_name, %err, "local save failed");
                LocalOutcome::Failed(err.to_string())
            }
        };

        let request = UploadRequest { filename: file_name.to_string(), data: data_url };
        let remote = match self.remote.upload(&request).await {
            Ok(response) => {
                info!(file_name, id = ?response.id, "upload succeeded");
                RemoteOutcome::Uploaded { id: response.id }
            }
            Err(err) => {
                warn!(file_name, %err, "upload failed");
                RemoteOutcome::Failed(err.to_string())
            }
        };

        Ok(SaveReport { file_name: file_name.to_string(), local, remote })
    }
}
