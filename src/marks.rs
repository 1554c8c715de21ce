//! コマンドラインのマーカー指定
//!
//! `--mark x,y[,radius[,color]]` と、同じ内容のJSONファイルを読む。

use crate::error::{AnnotatorError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use vehicle_annotator_common::{GestureSettings, Marker};

/// `x,y[,radius[,color]]` を解釈（座標はキャンバス座標）
pub fn parse_mark(value: &str, defaults: &GestureSettings) -> Result<Marker> {
    lazy_static::lazy_static! {
        static ref MARK_RE: Regex = Regex::new(
            r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*(?:,\s*(\d+(?:\.\d+)?)\s*(?:,\s*(#?[A-Za-z0-9]+)\s*)?)?$"
        ).unwrap();
    }

    let cap = MARK_RE
        .captures(value)
        .ok_or_else(|| AnnotatorError::InvalidMarker(format!("x,y[,半径[,色]] で指定してください: {}", value)))?;

    let number = |s: &str| {
        s.parse::<f32>()
            .map_err(|_| AnnotatorError::InvalidMarker(format!("数値が不正: {}", s)))
    };
    let x = number(&cap[1])?;
    let y = number(&cap[2])?;
    let radius = match cap.get(3) {
        Some(m) => number(m.as_str())?,
        None => defaults.marker_radius,
    };
    if radius <= 0.0 {
        return Err(AnnotatorError::InvalidMarker(format!("半径は正の値で指定してください: {}", value)));
    }
    let color = cap
        .get(4)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| defaults.marker_color.clone());

    Ok(Marker::new(x, y, radius, color))
}

#[derive(Debug, Deserialize)]
struct MarkEntry {
    x: f32,
    y: f32,
    radius: Option<f32>,
    color: Option<String>,
}

/// JSON配列のマーカーファイルを読む（半径・色は省略可）
pub fn load_marks_file(path: &Path, defaults: &GestureSettings) -> Result<Vec<Marker>> {
    if !path.is_file() {
        return Err(AnnotatorError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<MarkEntry> = serde_json::from_str(&content)?;

    entries
        .into_iter()
        .map(|entry| {
            let radius = entry.radius.unwrap_or(defaults.marker_radius);
            if radius <= 0.0 {
                return Err(AnnotatorError::InvalidMarker(format!(
                    "半径は正の値で指定してください: ({}, {})",
                    entry.x, entry.y
                )));
            }
            Ok(Marker::new(
                entry.x,
                entry.y,
                radius,
                entry.color.unwrap_or_else(|| defaults.marker_color.clone()),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let marker = parse_mark("50,50", &GestureSettings::default()).unwrap();
        assert_eq!(marker, Marker::new(50.0, 50.0, 30.0, "red"));
    }

    #[test]
    fn test_parse_full() {
        let marker = parse_mark(" 12.5, 40 , 18, #00ff00", &GestureSettings::default()).unwrap();
        assert_eq!(marker, Marker::new(12.5, 40.0, 18.0, "#00ff00"));
    }

    #[test]
    fn test_parse_invalid() {
        let defaults = GestureSettings::default();
        assert!(matches!(parse_mark("50", &defaults), Err(AnnotatorError::InvalidMarker(_))));
        assert!(matches!(parse_mark("a,b", &defaults), Err(AnnotatorError::InvalidMarker(_))));
        assert!(matches!(parse_mark("1,2,0", &defaults), Err(AnnotatorError::InvalidMarker(_))));
    }

    #[test]
    fn test_load_marks_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marks.json");
        std::fs::write(&path, r#"[{"x": 10, "y": 20}, {"x": 1, "y": 2, "radius": 5, "color": "blue"}]"#).unwrap();

        let markers = load_marks_file(&path, &GestureSettings::default()).unwrap();
        assert_eq!(markers[0], Marker::new(10.0, 20.0, 30.0, "red"));
        assert_eq!(markers[1], Marker::new(1.0, 2.0, 5.0, "blue"));
    }
}
