use anyhow::{Context, Result};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use image::ImageReader;
use vehicle_annotator_common::Marker;

/// 表示用テクスチャの最大辺
const MAX_TEXTURE_SIDE: u32 = 2048;

pub struct DecodedImage {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}

pub fn decode_for_display(path: &Path) -> Result<DecodedImage> {
    let image = ImageReader::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("read {}", path.display()))?
        .decode()
        .with_context(|| format!("decode {}", path.display()))?;

    let image = if image.width() > MAX_TEXTURE_SIDE || image.height() > MAX_TEXTURE_SIDE {
        image.thumbnail(MAX_TEXTURE_SIDE, MAX_TEXTURE_SIDE)
    } else {
        image
    };
    Ok(DecodedImage {
        size: [image.width() as usize, image.height() as usize],
        pixels: image.to_rgba8().into_raw(),
    })
}

/// CLIに渡すマーカーファイルを書き出す
pub fn write_marks_file(path: &Path, markers: &[Marker]) -> Result<()> {
    let content = serde_json::to_string_pretty(markers)?;
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// 同名ファイルが別フォルダにあっても衝突しないよう、フルパスのハッシュを付ける
pub fn marks_path_for(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frame");
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    std::env::temp_dir().join(format!("{stem}-{:016x}.marks.json", hasher.finish()))
}
