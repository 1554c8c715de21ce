//! 座標系の基本型
//!
//! マーカーはビューア上のキャンバス座標で保持し、
//! 保存時にのみ画像ピクセル座標へ変換する。

use serde::{Deserialize, Serialize};

/// キャンバス座標上の点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 2点間のユークリッド距離
    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// ビューアのキャンバスサイズ（表示上の幅・高さ）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// キャンバス→画像の縮尺（軸ごとに独立）
    pub fn scale_to(&self, image_width: u32, image_height: u32) -> (f32, f32) {
        (
            image_width as f32 / self.width,
            image_height as f32 / self.height,
        )
    }
}

impl std::str::FromStr for CanvasSize {
    type Err = String;

    /// "800x600" 形式
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Invalid canvas size: {}. Use WIDTHxHEIGHT", s))?;
        let width: f32 = w.trim().parse().map_err(|_| format!("Invalid width: {}", w))?;
        let height: f32 = h.trim().parse().map_err(|_| format!("Invalid height: {}", h))?;
        let size = CanvasSize::new(width, height);
        if size.is_empty() {
            return Err(format!("Canvas size must be positive: {}", s));
        }
        Ok(size)
    }
}
