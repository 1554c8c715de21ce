use super::{CameraOutcome, LocalSave, Navigation, PlatformAdapter, WebAdapter};
use crate::error::{AnnotatorError, Result};
use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// ホストが提供する機能
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeCapabilities {
    pub open_camera: bool,
    pub save_image_base64: bool,
    pub go_back_to_dashboard: bool,
}

/// 組み込み先ホストの呼び出し口
pub trait HostBridge: Send + Sync {
    fn capabilities(&self) -> BridgeCapabilities;
    /// 撮影画像のパスまたはURIを返す。キャンセル時は None
    fn open_camera(&self) -> Result<Option<String>>;
    fn save_image_base64(&self, data_url: &str) -> Result<()>;
    fn go_back_to_dashboard(&self) -> Result<()>;
}

/// 外部コマンドをホストブリッジとして使う
///
/// `<command> capabilities` がJSONで機能一覧を返すこと。
/// 保存はデータURLを標準入力に流す。
#[derive(Debug, Clone)]
pub struct CommandBridge {
    program: String,
    capabilities: BridgeCapabilities,
}

impl CommandBridge {
    /// 起動確認と機能問い合わせ
    pub fn probe(program: &str) -> Result<Self> {
        let output = Command::new(program)
            .arg("capabilities")
            .output()
            .map_err(|e| AnnotatorError::HostBridge(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            return Err(AnnotatorError::HostBridge(format!(
                "{} capabilities が失敗しました: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let capabilities: BridgeCapabilities = serde_json::from_slice(&output.stdout)
            .map_err(|e| AnnotatorError::HostBridge(format!("機能一覧のパースに失敗: {}", e)))?;
        Ok(Self { program: program.to_string(), capabilities })
    }

    fn run(&self, action: &str, stdin: Option<&str>) -> Result<String> {
        let mut child = Command::new(&self.program)
            .arg(action)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnnotatorError::HostBridge(format!("{} {}: {}", self.program, action, e)))?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(AnnotatorError::HostBridge(format!(
                "{} {} が失敗しました: {}",
                self.program,
                action,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl HostBridge for CommandBridge {
    fn capabilities(&self) -> BridgeCapabilities {
        self.capabilities
    }

    fn open_camera(&self) -> Result<Option<String>> {
        let captured = self.run("open-camera", None)?;
        Ok((!captured.is_empty()).then_some(captured))
    }

    fn save_image_base64(&self, data_url: &str) -> Result<()> {
        self.run("save-image", Some(data_url)).map(|_| ())
    }

    fn go_back_to_dashboard(&self) -> Result<()> {
        self.run("back", None).map(|_| ())
    }
}

/// ホストブリッジ経由のアダプタ。ホストにない機能はWeb側で代替する
pub struct EmbeddedHostAdapter {
    bridge: Box<dyn HostBridge>,
    fallback: WebAdapter,
}

impl EmbeddedHostAdapter {
    pub fn new(bridge: Box<dyn HostBridge>, fallback: WebAdapter) -> Self {
        Self { bridge, fallback }
    }
}

impl PlatformAdapter for EmbeddedHostAdapter {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn open_camera(&self) -> Result<CameraOutcome> {
        if !self.bridge.capabilities().open_camera {
            debug!("host has no camera, falling back");
            return self.fallback.open_camera();
        }
        match self.bridge.open_camera()? {
            Some(captured) => Ok(CameraOutcome::Captured(captured)),
            None => Ok(CameraOutcome::Unavailable("撮影がキャンセルされました".into())),
        }
    }

    fn save_local(&self, file_name: &str, data_url: &str) -> Result<LocalSave> {
        if !self.bridge.capabilities().save_image_base64 {
            return self.fallback.save_local(file_name, data_url);
        }
        self.bridge.save_image_base64(data_url)?;
        Ok(LocalSave::Device)
    }

    fn navigate_back(&self) -> Result<Navigation> {
        if !self.bridge.capabilities().go_back_to_dashboard {
            return self.fallback.navigate_back();
        }
        match self.bridge.go_back_to_dashboard() {
            Ok(()) => Ok(Navigation::Host),
            Err(err) => {
                warn!(%err, "host navigation failed");
                self.fallback.navigate_back()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use vehicle_annotator_common::data_url::encode_data_url;

    struct FakeBridge {
        capabilities: BridgeCapabilities,
        saved: Mutex<Vec<String>>,
    }

    impl FakeBridge {
        fn new(capabilities: BridgeCapabilities) -> Self {
            Self { capabilities, saved: Mutex::new(Vec::new()) }
        }
    }

    impl HostBridge for FakeBridge {
        fn capabilities(&self) -> BridgeCapabilities {
            self.capabilities
        }

        fn open_camera(&self) -> Result<Option<String>> {
            Ok(Some("content://camera/1".into()))
        }

        fn save_image_base64(&self, data_url: &str) -> Result<()> {
            self.saved.lock().unwrap().push(data_url.to_string());
            Ok(())
        }

        fn go_back_to_dashboard(&self) -> Result<()> {
            Err(AnnotatorError::HostBridge("no dashboard".into()))
        }
    }

    #[test]
    fn test_full_bridge_used() {
        let caps = BridgeCapabilities { open_camera: true, save_image_base64: true, go_back_to_dashboard: false };
        let adapter = EmbeddedHostAdapter::new(
            Box::new(FakeBridge::new(caps)),
            WebAdapter::new(std::path::PathBuf::from(".")),
        );

        assert_eq!(
            adapter.open_camera().unwrap(),
            CameraOutcome::Captured("content://camera/1".into())
        );
        let url = encode_data_url("image/jpeg", b"x");
        assert_eq!(adapter.save_local("a.jpg", &url).unwrap(), LocalSave::Device);
        assert_eq!(adapter.navigate_back().unwrap(), Navigation::InApp("dashboard".into()));
    }

    #[test]
    fn test_missing_capabilities_degrade_to_web() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = EmbeddedHostAdapter::new(
            Box::new(FakeBridge::new(BridgeCapabilities::default())),
            WebAdapter::new(dir.path().to_path_buf()),
        );

        assert!(matches!(adapter.open_camera().unwrap(), CameraOutcome::Unavailable(_)));
        let url = encode_data_url("image/jpeg", b"bytes");
        assert_eq!(
            adapter.save_local("a.jpg", &url).unwrap(),
            LocalSave::File(dir.path().join("a.jpg"))
        );
    }

    #[test]
    fn test_capabilities_json() {
        let caps: BridgeCapabilities =
            serde_json::from_str(r#"{"openCamera": true, "saveImageBase64": true}"#).unwrap();
        assert!(caps.open_camera && caps.save_image_base64 && !caps.go_back_to_dashboard);
    }
}
