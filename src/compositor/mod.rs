//! マーカー合成
//!
//! キャンバス座標のマーカーを元画像の解像度に拡大して描き込み、JPEGにする。
//! 表示サイズやズームに関係なく、見たままの位置に円が残る。

mod color;

pub use color::parse_color;

use crate::error::{AnnotatorError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;
use vehicle_annotator_common::{CanvasSize, Marker};

pub const DEFAULT_JPEG_QUALITY: u8 = 90;
/// 画像ピクセル単位の線幅
pub const STROKE_WIDTH: f32 = 4.0;

/// 画像ピクセル座標の円
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageCircle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

/// キャンバス座標 → 画像座標（軸ごとに独立、半径はX方向の縮尺）
pub fn to_image_space(marker: &Marker, canvas: CanvasSize, width: u32, height: u32) -> ImageCircle {
    let (sx, sy) = canvas.scale_to(width, height);
    ImageCircle {
        cx: marker.x * sx,
        cy: marker.y * sy,
        radius: marker.radius * sx,
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| AnnotatorError::Decode(e.to_string()))
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.is_file() {
        return Err(AnnotatorError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    decode_image(&bytes).map_err(|e| match e {
        AnnotatorError::Decode(msg) => AnnotatorError::Decode(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    quality: u8,
    stroke_width: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl Compositor {
    pub fn new(quality: u8) -> Self {
        Self { quality: quality.clamp(1, 100), stroke_width: STROKE_WIDTH }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// 元画像にマーカーを描き込んだラスタを返す
    pub fn render(&self, base: &DynamicImage, markers: &[Marker], canvas: CanvasSize) -> Result<RgbImage> {
        if canvas.is_empty() {
            return Err(AnnotatorError::InvalidMarker(format!(
                "キャンバスサイズが不正です: {}x{}",
                canvas.width, canvas.height
            )));
        }

        let mut raster = base.to_rgb8();
        let (width, height) = raster.dimensions();
        for marker in markers {
            let circle = to_image_space(marker, canvas, width, height);
            draw_ring(&mut raster, circle, self.stroke_width, parse_color(&marker.color));
        }
        debug!(width, height, markers = markers.len(), "rendered markers");
        Ok(raster)
    }

    /// 合成してJPEGバイト列を返す
    pub fn composite(&self, base: &DynamicImage, markers: &[Marker], canvas: CanvasSize) -> Result<Vec<u8>> {
        let raster = self.render(base, markers, canvas)?;
        self.encode_jpeg(&raster)
    }

    pub fn encode_jpeg(&self, raster: &RgbImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        raster
            .write_with_encoder(encoder)
            .map_err(|e| AnnotatorError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// 円周を線幅分だけ塗る（ピクセル中心と円周の距離で判定）
fn draw_ring(raster: &mut RgbImage, circle: ImageCircle, stroke_width: f32, color: Rgb<u8>) {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let half = stroke_width / 2.0;
    let outer = circle.radius + half;

    let x0 = (circle.cx - outer).floor().max(0.0) as u32;
    let y0 = (circle.cy - outer).floor().max(0.0) as u32;
    let x1 = ((circle.cx + outer).ceil().max(0.0) as u32).min(width - 1);
    let y1 = ((circle.cy + outer).ceil().max(0.0) as u32).min(height - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    for y in y0..=y1 {
        let dy = y as f32 + 0.5 - circle.cy;
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - circle.cx;
            if ((dx.hypot(dy)) - circle.radius).abs() <= half {
                raster.put_pixel(x, y, color);
            }
        }
    }
}
