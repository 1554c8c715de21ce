//! 画像取り込み → マーキング → 合成
//!
//! 保存処理（ローカル・リモート）は `sync::SyncClient` に任せる。

use crate::compositor::{load_image, Compositor};
use crate::error::{AnnotatorError, Result};
use crate::scanner;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vehicle_annotator_common::{AnnotationSession, CanvasSize, Frame, FrameSnapshot, GestureSettings, Marker};

/// 合成済み画像
#[derive(Debug, Clone)]
pub struct Composed {
    pub frame_index: usize,
    pub frame_name: String,
    pub marker_count: usize,
    pub jpeg: Vec<u8>,
}

/// 画像パス（ファイルまたはフォルダ）からセッションを作る
pub fn open_session(inputs: &[PathBuf], settings: GestureSettings) -> Result<AnnotationSession> {
    if inputs.is_empty() {
        return Err(AnnotatorError::InputMissing);
    }

    let mut images = Vec::new();
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            images.extend(scanner::scan_folder(input)?);
        } else {
            files.push(input.clone());
        }
    }
    images.extend(scanner::scan_paths(&files)?);

    if images.is_empty() {
        let joined = inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AnnotatorError::NoImagesFound(joined));
    }

    let mut session = AnnotationSession::new(settings);
    let count = session.import_frames(scanner::to_frames(&images));
    info!(frames = count, "session opened");
    Ok(session)
}

/// スナップショットを合成
///
/// デコードとエンコードはブロッキングスレッドで行う。
/// キャンバス未指定なら画像と同寸法（等倍）とみなす。
pub async fn compose(
    snapshot: FrameSnapshot,
    canvas: Option<CanvasSize>,
    compositor: Compositor,
) -> Result<Composed> {
    tokio::task::spawn_blocking(move || compose_blocking(&snapshot, canvas, &compositor))
        .await
        .map_err(|e| AnnotatorError::Decode(format!("合成タスクが中断されました: {}", e)))?
}

pub fn compose_blocking(
    snapshot: &FrameSnapshot,
    canvas: Option<CanvasSize>,
    compositor: &Compositor,
) -> Result<Composed> {
    let base = load_image(Path::new(&snapshot.frame.source))?;
    let canvas = canvas.unwrap_or_else(|| CanvasSize::new(base.width() as f32, base.height() as f32));
    let jpeg = compositor.composite(&base, &snapshot.markers, canvas)?;
    debug!(frame = %snapshot.frame.name, bytes = jpeg.len(), "composed frame");

    Ok(Composed {
        frame_index: snapshot.index,
        frame_name: snapshot.frame.name.clone(),
        marker_count: snapshot.markers.len(),
        jpeg,
    })
}

/// フレームを選んでマーカーを追加し、保存用スナップショットを返す
pub fn mark_frame(
    session: &mut AnnotationSession,
    frame: usize,
    markers: Vec<Marker>,
) -> Result<FrameSnapshot> {
    session.jump_to(frame)?;
    for marker in markers {
        session.add_marker(marker);
    }
    session.snapshot().ok_or(AnnotatorError::InputMissing)
}

/// 撮影画像をセッション末尾に追加し、現在フレームにする
///
/// 追加先は空のマーカー一覧から始まる。戻り値は追加したフレーム番号。
pub fn add_captured(session: &mut AnnotationSession, captured: &str) -> usize {
    let name = Path::new(captured)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| captured.to_string());
    let index = session.add_captured(Frame::new(name, captured));
    info!(frame = index, source = %captured, "captured image added");
    index
}
