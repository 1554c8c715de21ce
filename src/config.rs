use crate::error::{AnnotatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vehicle_annotator_common::GestureSettings;

pub const SERVER_URL_ENV: &str = "VEHICLE_ANNOTATOR_SERVER_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 画像ストアのベースURL
    pub server_url: String,
    pub timeout_seconds: u64,
    /// 合成画像のJPEG品質 (1-100)
    pub jpeg_quality: u8,
    /// ローカル保存先（未設定時はダウンロードフォルダ）
    pub save_dir: Option<PathBuf>,
    /// ホストブリッジとして起動するコマンド
    pub host_bridge: Option<String>,
    pub log_level: String,
    pub gesture: GestureSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".into(),
            timeout_seconds: 30,
            jpeg_quality: 90,
            save_dir: None,
            host_bridge: None,
            log_level: "info".into(),
            gesture: GestureSettings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<Config>(&content)?
        } else {
            Self::default()
        };
        config.validate()?;

        // 環境変数を優先
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AnnotatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("vehicle-annotator").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AnnotatorError::Config(format!(
                "jpeg_quality は 1-100 で指定してください: {}",
                self.jpeg_quality
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(AnnotatorError::Config("timeout_seconds は 1 以上で指定してください".into()));
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(AnnotatorError::Config(format!(
                "server_url は http:// または https:// で始めてください: {}",
                self.server_url
            )));
        }
        Ok(())
    }

    pub fn set_server_url(&mut self, url: String) -> Result<()> {
        self.server_url = url.trim_end_matches('/').to_string();
        self.validate()?;
        self.save()
    }

    /// ローカル保存先（設定 → ダウンロード → カレント）
    pub fn resolve_save_dir(&self) -> PathBuf {
        self.save_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.gesture.double_tap_ms, 400);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"server_url": "https://example.org"}"#).unwrap();
        assert_eq!(config.server_url, "https://example.org");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.gesture.marker_radius, 30.0);
    }

    #[test]
    fn test_invalid_quality() {
        let config = Config { jpeg_quality: 0, ..Config::default() };
        assert!(matches!(config.validate(), Err(AnnotatorError::Config(_))));
    }

    #[test]
    fn test_invalid_server_url() {
        let config = Config { server_url: "localhost:3000".into(), ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_dir_override() {
        let config = Config { save_dir: Some(PathBuf::from("/tmp/out")), ..Config::default() };
        assert_eq!(config.resolve_save_dir(), PathBuf::from("/tmp/out"));
    }
}
