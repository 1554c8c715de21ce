//! ポインタ入力の分類
//!
//! マウス/タッチの生イベント列を、回転・ズーム・マーカー編集の意図（Intent）に変換する。
//! マウスはポインタID 0 の単一ポインタとして扱う。
//!
//! - マーキングモードOFF: 1本指/ドラッグ = 回転
//! - マーキングモードON: 1本指/クリック = マーカー追加・移動・削除
//! - 2本指ピンチとホイールはどちらのモードでもズーム
//!
//! ダブルタップ削除の400msタイマーはキャンバス単位（マーカー単位ではない）。
//! 近接する別マーカーを素早く連続タップすると2回目で削除になる。

use crate::geometry::Point;
use crate::marker::{MarkerId, MarkerStore, DEFAULT_MARKER_COLOR, DEFAULT_MARKER_RADIUS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 入力イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    #[serde(rename_all = "camelCase")]
    PointerDown {
        #[serde(default)]
        pointer: u64,
        x: f32,
        y: f32,
        time_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    PointerMove {
        #[serde(default)]
        pointer: u64,
        x: f32,
        y: f32,
    },
    #[serde(rename_all = "camelCase")]
    PointerUp {
        #[serde(default)]
        pointer: u64,
    },
    /// 負値 = 上スクロール（拡大）
    #[serde(rename_all = "camelCase")]
    Wheel { delta_y: f32 },
    DoubleClick,
}

/// 分類結果
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// -1 = 前のフレーム, +1 = 次のフレーム
    RotateBy(i32),
    /// ピンチ倍率（乗算）
    ZoomBy(f32),
    /// ホイール刻み（加算）
    ZoomStep(f32),
    ResetZoom,
    PlaceMarker(Point),
    BeginDrag(MarkerId),
    DragMarker { id: MarkerId, pos: Point },
    DeleteMarker(MarkerId),
    EndDrag,
}

/// ジェスチャー判定のしきい値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// 回転とみなす横移動量（キャンバス単位）
    pub rotate_threshold: f32,
    /// ダブルタップ削除の判定時間
    pub double_tap_ms: u64,
    pub marker_radius: f32,
    pub marker_color: String,
    pub wheel_step: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            rotate_threshold: 10.0,
            double_tap_ms: 400,
            marker_radius: DEFAULT_MARKER_RADIUS,
            marker_color: DEFAULT_MARKER_COLOR.to_string(),
            wheel_step: 0.1,
        }
    }
}

/// 分類に必要なセッション側の状態
pub struct ClassifyContext<'a> {
    pub marking: bool,
    pub frame: Option<usize>,
    pub markers: &'a MarkerStore,
}

#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    settings: GestureSettings,
    active: BTreeMap<u64, Point>,
    rotate_anchor_x: Option<f32>,
    pinch_reference: Option<f32>,
    last_mark_down_ms: Option<u64>,
    drag: Option<MarkerId>,
}

impl GestureClassifier {
    pub fn new(settings: GestureSettings) -> Self {
        Self { settings, ..Default::default() }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// 回転ドラッグまたはマーカードラッグ中
    pub fn is_dragging(&self) -> bool {
        self.rotate_anchor_x.is_some() || self.drag.is_some()
    }

    /// 進行中のジェスチャーを破棄（モード切替時など）
    pub fn reset(&mut self) {
        self.active.clear();
        self.rotate_anchor_x = None;
        self.pinch_reference = None;
        self.drag = None;
    }

    pub fn classify(&mut self, event: &InputEvent, ctx: &ClassifyContext<'_>) -> Vec<Intent> {
        match *event {
            InputEvent::PointerDown { pointer, x, y, time_ms } => {
                self.pointer_down(pointer, Point::new(x, y), time_ms, ctx)
            }
            InputEvent::PointerMove { pointer, x, y } => {
                self.pointer_move(pointer, Point::new(x, y), ctx)
            }
            InputEvent::PointerUp { pointer } => self.pointer_up(pointer, ctx),
            InputEvent::Wheel { delta_y } => {
                let step = if delta_y < 0.0 {
                    self.settings.wheel_step
                } else {
                    -self.settings.wheel_step
                };
                vec![Intent::ZoomStep(step)]
            }
            InputEvent::DoubleClick => vec![Intent::ResetZoom],
        }
    }

    fn pointer_down(
        &mut self,
        pointer: u64,
        pos: Point,
        time_ms: u64,
        ctx: &ClassifyContext<'_>,
    ) -> Vec<Intent> {
        self.active.insert(pointer, pos);

        match self.active.len() {
            1 => {
                if ctx.marking {
                    self.mark_down(pos, time_ms, ctx)
                } else {
                    self.rotate_anchor_x = Some(pos.x);
                    Vec::new()
                }
            }
            2 => {
                // 2本目でピンチ開始。回転/ドラッグは打ち切る
                self.rotate_anchor_x = None;
                self.pinch_reference = self.pinch_distance();
                match self.drag.take() {
                    Some(_) => vec![Intent::EndDrag],
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn mark_down(&mut self, pos: Point, time_ms: u64, ctx: &ClassifyContext<'_>) -> Vec<Intent> {
        let Some(frame) = ctx.frame else {
            return Vec::new();
        };

        let within_window = self
            .last_mark_down_ms
            .map(|last| time_ms.saturating_sub(last) < self.settings.double_tap_ms)
            .unwrap_or(false);
        self.last_mark_down_ms = Some(time_ms);

        match ctx.markers.hit_test(frame, pos) {
            None => vec![Intent::PlaceMarker(pos)],
            Some(id) if within_window => vec![Intent::DeleteMarker(id)],
            Some(id) => {
                self.drag = Some(id);
                vec![Intent::BeginDrag(id)]
            }
        }
    }

    fn pointer_move(&mut self, pointer: u64, pos: Point, ctx: &ClassifyContext<'_>) -> Vec<Intent> {
        // 押下されていないポインタの移動は無視
        let Some(slot) = self.active.get_mut(&pointer) else {
            return Vec::new();
        };
        *slot = pos;

        match self.active.len() {
            1 if ctx.marking => match self.drag {
                Some(id) => vec![Intent::DragMarker { id, pos }],
                None => Vec::new(),
            },
            1 => self.rotate_move(pos),
            2 => self.pinch_move(),
            _ => Vec::new(),
        }
    }

    fn rotate_move(&mut self, pos: Point) -> Vec<Intent> {
        let Some(anchor) = self.rotate_anchor_x else {
            return Vec::new();
        };
        let delta = pos.x - anchor;
        if delta.abs() <= self.settings.rotate_threshold {
            return Vec::new();
        }
        self.rotate_anchor_x = Some(pos.x);
        // 右へ = 前のフレーム、左へ = 次のフレーム
        vec![Intent::RotateBy(if delta > 0.0 { -1 } else { 1 })]
    }

    fn pinch_move(&mut self) -> Vec<Intent> {
        let Some(distance) = self.pinch_distance() else {
            return Vec::new();
        };
        let previous = self.pinch_reference.replace(distance);
        match previous {
            Some(reference) if reference > 0.0 && distance > 0.0 => {
                vec![Intent::ZoomBy(distance / reference)]
            }
            _ => Vec::new(),
        }
    }

    fn pointer_up(&mut self, pointer: u64, ctx: &ClassifyContext<'_>) -> Vec<Intent> {
        if self.active.remove(&pointer).is_none() {
            return Vec::new();
        }

        // 3本以上から2本に戻ったら残った組の距離を新しい基準にする
        self.pinch_reference = match self.active.len() {
            2 => self.pinch_distance(),
            _ => None,
        };
        // ピンチから1本指に戻った場合は残った指を回転の基準にする（マーキング中は回転しない）
        self.rotate_anchor_x = match self.active.len() {
            1 if !ctx.marking && self.drag.is_none() => self.active.values().next().map(|p| p.x),
            _ => None,
        };

        if self.active.is_empty() && self.drag.take().is_some() {
            return vec![Intent::EndDrag];
        }
        Vec::new()
    }

    fn pinch_distance(&self) -> Option<f32> {
        let mut points = self.active.values();
        let a = points.next()?;
        let b = points.next()?;
        Some(a.distance_to(*b))
    }
}
