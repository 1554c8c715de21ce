//! 画像の取り込み
//!
//! フォルダ取り込み・ファイル指定のどちらもファイル名順に並べて返す。
//! 選択順に関係なく初期フレーム順が決まる。

mod exif;

use crate::error::{AnnotatorError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use vehicle_annotator_common::Frame;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    /// EXIF撮影日時
    pub date: Option<String>,
}

impl ImageInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let date = exif::extract_date(path).ok();
        Self { path: path.to_path_buf(), file_name, date }
    }

    pub fn to_frame(&self) -> Frame {
        Frame::new(&self.file_name, self.path.to_string_lossy())
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// フォルダ直下の画像をファイル名順で返す
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(AnnotatorError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_image_path(e.path()))
        .map(|e| ImageInfo::from_path(e.path()))
        .collect();

    sort_by_name(&mut images);
    debug!(folder = %folder.display(), count = images.len(), "scanned folder");
    Ok(images)
}

/// 個別に選択されたファイルをファイル名順で返す
pub fn scan_paths(paths: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_file() {
            return Err(AnnotatorError::FileNotFound(path.display().to_string()));
        }
        images.push(ImageInfo::from_path(path));
    }
    sort_by_name(&mut images);
    Ok(images)
}

fn sort_by_name(images: &mut [ImageInfo]) {
    // 同名ファイルはパスで安定させる
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name).then_with(|| a.path.cmp(&b.path)));
}

pub fn to_frames(images: &[ImageInfo]) -> Vec<Frame> {
    images.iter().map(ImageInfo::to_frame).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("a.jpg")));
        assert!(is_image_path(Path::new("a.JPG")));
        assert!(is_image_path(Path::new("a.Jpeg")));
        assert!(is_image_path(Path::new("a.png")));
        assert!(!is_image_path(Path::new("a.txt")));
        assert!(!is_image_path(Path::new("jpg")));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(AnnotatorError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.jpg", "a.PNG", "b.jpeg", "notes.txt"] {
            File::create(dir.path().join(name)).unwrap().write_all(b"dummy").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("0.jpg")).unwrap();

        let result = scan_folder(dir.path()).unwrap();
        let names: Vec<_> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpeg", "c.jpg"]);
        assert!(result.iter().all(|i| i.date.is_none()));
    }

    #[test]
    fn test_scan_paths_sorted_regardless_of_selection_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = ["front.jpg", "back.jpg", "left.jpg"]
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                File::create(&p).unwrap();
                p
            })
            .collect();

        let frames = to_frames(&scan_paths(&paths).unwrap());
        let names: Vec<_> = frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["back.jpg", "front.jpg", "left.jpg"]);
    }

    #[test]
    fn test_scan_paths_missing_file() {
        let result = scan_paths(&[PathBuf::from("/nonexistent/x.jpg")]);
        assert!(matches!(result, Err(AnnotatorError::FileNotFound(_))));
    }
}
