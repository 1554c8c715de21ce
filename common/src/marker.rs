//! マーカー（円形アノテーション）とフレーム別ストア
//!
//! - 座標はビューアのキャンバス座標
//! - フレーム番号ごとに挿入順で保持
//! - 「マーカーなし」はエントリなしに正規化（空Vecは保持しない）

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MARKER_RADIUS: f32 = 30.0;
pub const DEFAULT_MARKER_COLOR: &str = "red";

/// 円形マーカー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_MARKER_COLOR.to_string()
}

impl Marker {
    pub fn new(x: f32, y: f32, radius: f32, color: impl Into<String>) -> Self {
        Self { x, y, radius, color: color.into() }
    }

    /// 既定の半径・色でマーカーを作成
    pub fn at(pos: Point) -> Self {
        Self::new(pos.x, pos.y, DEFAULT_MARKER_RADIUS, DEFAULT_MARKER_COLOR)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// 点が円の内側か（境界は含まない）
    pub fn contains(&self, point: Point) -> bool {
        self.center().distance_to(point) < self.radius
    }
}

/// ストア内でマーカーを指す安定ID
///
/// 同じフレームの他のマーカーが削除されても変わらない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub id: MarkerId,
    pub marker: Marker,
}

/// フレーム番号 → マーカー列
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    frames: BTreeMap<usize, Vec<MarkerEntry>>,
    next_id: u64,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// マーカーを追加
    pub fn add(&mut self, frame: usize, marker: Marker) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.frames
            .entry(frame)
            .or_default()
            .push(MarkerEntry { id, marker });
        id
    }

    /// マーカーを削除し、削除したマーカーを返す
    pub fn remove(&mut self, frame: usize, id: MarkerId) -> Option<Marker> {
        let entries = self.frames.get_mut(&frame)?;
        let pos = entries.iter().position(|e| e.id == id)?;
        let removed = entries.remove(pos);
        if entries.is_empty() {
            self.frames.remove(&frame);
        }
        Some(removed.marker)
    }

    /// マーカー中心を移動。半径・色はそのまま
    pub fn move_to(&mut self, frame: usize, id: MarkerId, x: f32, y: f32) -> bool {
        match self.get_mut(frame, id) {
            Some(marker) => {
                marker.x = x;
                marker.y = y;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, frame: usize, id: MarkerId) -> Option<&Marker> {
        self.entries_for(frame)
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.marker)
    }

    fn get_mut(&mut self, frame: usize, id: MarkerId) -> Option<&mut Marker> {
        self.frames
            .get_mut(&frame)?
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.marker)
    }

    /// フレームのエントリ（挿入順）。マーカーなしなら空スライス
    pub fn entries_for(&self, frame: usize) -> &[MarkerEntry] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    /// フレームのマーカー（挿入順）
    pub fn markers_for(&self, frame: usize) -> Vec<Marker> {
        self.entries_for(frame)
            .iter()
            .map(|e| e.marker.clone())
            .collect()
    }

    /// 点を含む最初のマーカー（重なりは挿入順で先勝ち）
    pub fn hit_test(&self, frame: usize, point: Point) -> Option<MarkerId> {
        self.entries_for(frame)
            .iter()
            .find(|e| e.marker.contains(point))
            .map(|e| e.id)
    }

    /// フレームのマーカーを全削除し、削除件数を返す
    pub fn clear_frame(&mut self, frame: usize) -> usize {
        self.frames.remove(&frame).map(|v| v.len()).unwrap_or(0)
    }

    /// マーカーを持つフレーム番号（昇順）
    pub fn frames_with_markers(&self) -> Vec<usize> {
        self.frames.keys().copied().collect()
    }

    /// 全フレームのマーカー総数
    pub fn total(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
