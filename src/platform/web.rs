use super::{CameraOutcome, LocalSave, Navigation, PlatformAdapter};
use crate::error::{AnnotatorError, Result};
use std::path::PathBuf;
use tracing::debug;
use vehicle_annotator_common::data_url::decode_data_url;

/// ホストなし環境。保存はダウンロード相当のファイル書き出し
#[derive(Debug, Clone)]
pub struct WebAdapter {
    save_dir: PathBuf,
}

impl WebAdapter {
    pub fn new(save_dir: PathBuf) -> Self {
        Self { save_dir }
    }

    pub fn save_dir(&self) -> &std::path::Path {
        &self.save_dir
    }
}

impl PlatformAdapter for WebAdapter {
    fn name(&self) -> &'static str {
        "web"
    }

    fn open_camera(&self) -> Result<CameraOutcome> {
        Ok(CameraOutcome::Unavailable(
            "カメラ機能はホストアプリ内でのみ利用できます".into(),
        ))
    }

    fn save_local(&self, file_name: &str, data_url: &str) -> Result<LocalSave> {
        let bytes = decode_data_url(data_url)?;

        // パス区切りを含む名前は拒否
        let name = std::path::Path::new(file_name);
        if name.file_name().map(|n| n != name.as_os_str()).unwrap_or(true) {
            return Err(AnnotatorError::LocalSave(format!("不正なファイル名: {}", file_name)));
        }

        std::fs::create_dir_all(&self.save_dir)
            .map_err(|e| AnnotatorError::LocalSave(format!("{}: {}", self.save_dir.display(), e)))?;
        let path = self.save_dir.join(file_name);
        std::fs::write(&path, bytes)
            .map_err(|e| AnnotatorError::LocalSave(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "saved image file");
        Ok(LocalSave::File(path))
    }

    fn navigate_back(&self) -> Result<Navigation> {
        Ok(Navigation::InApp("dashboard".into()))
    }
}
