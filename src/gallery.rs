//! 保存済み画像の一覧とダウンロード

use crate::error::{AnnotatorError, Result};
use crate::sync::RemoteImageStore;
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vehicle_annotator_common::data_url::{decode_data_url, extension_for, mime_type};
use vehicle_annotator_common::ImageRecord;

pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M";

#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub filename: String,
    /// 表示用の作成日時（dd-mm-YYYY HH:MM）
    pub created_label: String,
    pub record: ImageRecord,
}

/// ISO 8601 の作成日時を指定タイムゾーンで整形。解釈できなければそのまま返す
pub fn format_created_at_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(tz).format(DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn format_created_at(raw: &str) -> String {
    format_created_at_in(raw, &Local)
}

pub async fn fetch_gallery(store: &dyn RemoteImageStore) -> Result<Vec<GalleryEntry>> {
    let records = store.list_images().await?;
    debug!(count = records.len(), "fetched gallery");
    Ok(records
        .into_iter()
        .map(|record| GalleryEntry {
            filename: record.filename.clone(),
            created_label: format_created_at(&record.created_at),
            record,
        })
        .collect())
}

/// 保存先ファイル名。空や区切り文字入りの名前は連番に置き換える
fn target_name(entry: &GalleryEntry, index: usize) -> String {
    let name = Path::new(&entry.filename);
    match name.file_name() {
        Some(base) if base == name.as_os_str() && !entry.filename.is_empty() => entry.filename.clone(),
        _ => format!(
            "image_{}.{}",
            index + 1,
            extension_for(mime_type(&entry.record.data))
        ),
    }
}

/// 1件をディレクトリに書き出す
pub fn download_entry(entry: &GalleryEntry, index: usize, dir: &Path) -> Result<PathBuf> {
    let bytes = decode_data_url(&entry.record.data)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| AnnotatorError::LocalSave(format!("{}: {}", dir.display(), e)))?;
    let path = dir.join(target_name(entry, index));
    std::fs::write(&path, bytes)
        .map_err(|e| AnnotatorError::LocalSave(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}

/// 全件を書き出す。失敗した項目はスキップし、書き出したパスを返す
pub fn download_all(entries: &[GalleryEntry], dir: &Path) -> Vec<PathBuf> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match download_entry(entry, index, dir) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(filename = %entry.filename, %err, "skipping gallery entry");
                None
            }
        })
        .collect()
}
