//! プラットフォームアダプタ
//!
//! 起動時に1度だけ選択し、以降はカメラ・ローカル保存・戻る操作を同じ契約で扱う。
//! - WebAdapter: ホストなし（ファイル書き出し・アプリ内ナビゲーション）
//! - EmbeddedHostAdapter: ホストブリッジ経由。未対応の機能はWebAdapterに委譲

mod host;
mod web;

pub use host::{BridgeCapabilities, CommandBridge, EmbeddedHostAdapter, HostBridge};
pub use web::WebAdapter;

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;
use tracing::{info, warn};

/// カメラ起動の結果
#[derive(Debug, Clone, PartialEq)]
pub enum CameraOutcome {
    /// 撮影画像のパスまたはURI
    Captured(String),
    /// この環境では使えない
    Unavailable(String),
}

/// ローカル保存の結果
#[derive(Debug, Clone, PartialEq)]
pub enum LocalSave {
    /// ホスト端末に保存
    Device,
    /// ファイルとして書き出し
    File(PathBuf),
}

impl LocalSave {
    pub fn describe(&self) -> String {
        match self {
            LocalSave::Device => "端末に保存".to_string(),
            LocalSave::File(path) => format!("ファイルに保存: {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// ホスト側のダッシュボードへ戻った
    Host,
    /// アプリ内の画面へ戻る
    InApp(String),
}

pub trait PlatformAdapter: Send + Sync {
    fn name(&self) -> &'static str;
    fn open_camera(&self) -> Result<CameraOutcome>;
    fn save_local(&self, file_name: &str, data_url: &str) -> Result<LocalSave>;
    fn navigate_back(&self) -> Result<Navigation>;
}

/// 設定からアダプタを選択
///
/// ホストブリッジが応答しない場合はWebAdapterに落とす。
pub fn select_adapter(config: &Config) -> Box<dyn PlatformAdapter> {
    let web = WebAdapter::new(config.resolve_save_dir());

    let Some(command) = config.host_bridge.as_deref() else {
        info!(adapter = "web", "platform adapter selected");
        return Box::new(web);
    };

    match CommandBridge::probe(command) {
        Ok(bridge) => {
            info!(adapter = "embedded", command, capabilities = ?bridge.capabilities(), "platform adapter selected");
            Box::new(EmbeddedHostAdapter::new(Box::new(bridge), web))
        }
        Err(err) => {
            warn!(command, %err, "host bridge unavailable, using web adapter");
            Box::new(web)
        }
    }
}
