use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DATE_TAGS: &[exif::Tag] = &[
    exif::Tag::DateTimeOriginal,
    exif::Tag::DateTimeDigitized,
    exif::Tag::DateTime,
];

/// 撮影日時をEXIFから取得（撮影 → デジタル化 → 更新の順）
pub fn extract_date(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;

    DATE_TAGS
        .iter()
        .find_map(|tag| exif.get_field(*tag, exif::In::PRIMARY))
        .map(|field| field.display_value().to_string())
        .ok_or_else(|| "No date found in EXIF".into())
}
