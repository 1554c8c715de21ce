//! 注釈セッション
//!
//! フレームビューア・マーカーストア・ジェスチャー分類器を1つの所有者にまとめる。
//! 状態の変更はすべて `&mut self` 経由（UIスレッド専用）で行う。

use crate::autoplay::Autoplay;
use crate::error::Result;
use crate::geometry::Point;
use crate::gesture::{ClassifyContext, GestureClassifier, GestureSettings, InputEvent, Intent};
use crate::marker::{Marker, MarkerEntry, MarkerStore};
use crate::viewer::{Frame, FrameViewer};
use serde::Serialize;
use tracing::debug;

/// 表示状態のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub frame: Option<usize>,
    pub zoom: f32,
    pub dragging: bool,
    pub marking: bool,
}

/// 保存対象（現在フレームとそのマーカー）
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub index: usize,
    pub frame: Frame,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationSession {
    viewer: FrameViewer,
    markers: MarkerStore,
    gestures: GestureClassifier,
    autoplay: Autoplay,
    marking: bool,
}

impl AnnotationSession {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            gestures: GestureClassifier::new(settings),
            ..Default::default()
        }
    }

    pub fn viewer(&self) -> &FrameViewer {
        &self.viewer
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            frame: self.viewer.current_index(),
            zoom: self.viewer.zoom(),
            dragging: self.gestures.is_dragging(),
            marking: self.marking,
        }
    }

    // ---- フレーム ----

    /// ファイル選択からの一括追加
    pub fn import_frames(&mut self, frames: Vec<Frame>) -> usize {
        let range = self.viewer.append_batch(frames);
        range.len()
    }

    /// カメラ撮影画像を追加し、そのフレームへ移動
    pub fn add_captured(&mut self, frame: Frame) -> usize {
        let index = self.viewer.append(frame);
        // 範囲内なので失敗しない
        let _ = self.viewer.jump_to(index);
        index
    }

    pub fn next_frame(&mut self) {
        self.viewer.next();
    }

    pub fn previous_frame(&mut self) {
        self.viewer.previous();
    }

    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        self.viewer.jump_to(index)
    }

    pub fn reset_zoom(&mut self) {
        self.viewer.reset_zoom();
    }

    // ---- マーキングモード ----

    pub fn is_marking(&self) -> bool {
        self.marking
    }

    pub fn set_marking(&mut self, enabled: bool) {
        if self.marking != enabled {
            self.gestures.reset();
        }
        self.marking = enabled;
    }

    /// 切り替え後の状態を返す
    pub fn toggle_marking(&mut self) -> bool {
        self.set_marking(!self.marking);
        self.marking
    }

    pub fn marking_label(&self) -> &'static str {
        if self.marking {
            "Marking: On"
        } else {
            "Marking: Off"
        }
    }

    // ---- 自動回転 ----

    /// フレームがなければ開始しない
    pub fn start_autoplay(&mut self, now_ms: u64) -> bool {
        if self.viewer.is_empty() {
            return false;
        }
        self.autoplay.start(now_ms);
        true
    }

    pub fn stop_autoplay(&mut self) {
        self.autoplay.stop();
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_running()
    }

    /// 経過時間分だけフレームを進め、進めた数を返す
    pub fn tick(&mut self, now_ms: u64) -> u64 {
        let steps = self.autoplay.due_steps(now_ms);
        let len = self.viewer.len() as u64;
        if len == 0 {
            return 0;
        }
        for _ in 0..steps % len {
            self.viewer.next();
        }
        steps
    }

    // ---- 入力 ----

    /// 入力イベントを分類して適用する
    pub fn handle(&mut self, event: &InputEvent) -> Vec<Intent> {
        let ctx = ClassifyContext {
            marking: self.marking,
            frame: self.viewer.current_index(),
            markers: &self.markers,
        };
        let intents = self.gestures.classify(event, &ctx);
        for intent in &intents {
            self.apply(intent);
        }
        intents
    }

    fn apply(&mut self, intent: &Intent) {
        debug!(?intent, "apply intent");
        match *intent {
            Intent::RotateBy(step) if step < 0 => {
                for _ in 0..step.unsigned_abs() {
                    self.viewer.previous();
                }
            }
            Intent::RotateBy(step) => {
                for _ in 0..step {
                    self.viewer.next();
                }
            }
            Intent::ZoomBy(factor) => {
                self.viewer.zoom_by(factor);
            }
            Intent::ZoomStep(delta) => {
                self.viewer.zoom_step(delta);
            }
            Intent::ResetZoom => self.viewer.reset_zoom(),
            Intent::PlaceMarker(pos) => {
                if let Some(frame) = self.viewer.current_index() {
                    let settings = self.gestures.settings();
                    let marker = Marker::new(
                        pos.x,
                        pos.y,
                        settings.marker_radius,
                        settings.marker_color.clone(),
                    );
                    self.markers.add(frame, marker);
                    self.viewer.request_render();
                }
            }
            Intent::DragMarker { id, pos } => {
                if let Some(frame) = self.viewer.current_index() {
                    if self.markers.move_to(frame, id, pos.x, pos.y) {
                        self.viewer.request_render();
                    }
                }
            }
            Intent::DeleteMarker(id) => {
                if let Some(frame) = self.viewer.current_index() {
                    if self.markers.remove(frame, id).is_some() {
                        self.viewer.request_render();
                    }
                }
            }
            Intent::BeginDrag(_) | Intent::EndDrag => {}
        }
    }

    // ---- マーカー ----

    /// 現在フレームのマーカー（描画用）
    pub fn current_markers(&self) -> &[MarkerEntry] {
        match self.viewer.current_index() {
            Some(frame) => self.markers.entries_for(frame),
            None => &[],
        }
    }

    /// 現在フレームにマーカーを直接追加（CLIの座標指定など）
    pub fn add_marker(&mut self, marker: Marker) -> bool {
        let Some(frame) = self.viewer.current_index() else {
            return false;
        };
        self.markers.add(frame, marker);
        self.viewer.request_render();
        true
    }

    pub fn clear_current_markers(&mut self) -> usize {
        let Some(frame) = self.viewer.current_index() else {
            return 0;
        };
        let removed = self.markers.clear_frame(frame);
        if removed > 0 {
            self.viewer.request_render();
        }
        removed
    }

    pub fn marker_at(&self, point: Point) -> Option<&Marker> {
        let frame = self.viewer.current_index()?;
        let id = self.markers.hit_test(frame, point)?;
        self.markers.get(frame, id)
    }

    /// 保存用スナップショット。フレームがなければNone
    pub fn snapshot(&self) -> Option<FrameSnapshot> {
        let index = self.viewer.current_index()?;
        let frame = self.viewer.current_frame()?.clone();
        Some(FrameSnapshot {
            index,
            frame,
            markers: self.markers.markers_for(index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::MAX_ZOOM;

    fn session_with(n: usize) -> AnnotationSession {
        let mut session = AnnotationSession::default();
        let frames = (0..n)
            .map(|i| Frame::new(format!("{:02}.jpg", i), format!("/photos/{:02}.jpg", i)))
            .collect();
        session.import_frames(frames);
        session
    }

    fn down(x: f32, y: f32, time_ms: u64) -> InputEvent {
        InputEvent::PointerDown { pointer: 0, x, y, time_ms }
    }

    #[test]
    fn test_click_then_quick_click_removes_marker() {
        let mut session = session_with(1);
        session.set_marking(true);

        session.handle(&down(50.0, 50.0, 1_000));
        session.handle(&InputEvent::PointerUp { pointer: 0 });
        assert_eq!(session.current_markers().len(), 1);
        assert_eq!(session.current_markers()[0].marker.radius, 30.0);

        session.handle(&down(50.0, 50.0, 1_200));
        session.handle(&InputEvent::PointerUp { pointer: 0 });
        assert!(session.current_markers().is_empty());
        assert!(session.markers().frames_with_markers().is_empty());
    }

    #[test]
    fn test_drag_moves_marker() {
        let mut session = session_with(1);
        session.set_marking(true);
        session.handle(&down(50.0, 50.0, 0));
        session.handle(&InputEvent::PointerUp { pointer: 0 });

        session.handle(&down(55.0, 50.0, 5_000));
        assert!(session.view_state().dragging);
        session.handle(&InputEvent::PointerMove { pointer: 0, x: 120.0, y: 80.0 });
        session.handle(&InputEvent::PointerUp { pointer: 0 });

        let markers = session.snapshot().unwrap().markers;
        assert_eq!(markers, vec![Marker::new(120.0, 80.0, 30.0, "red")]);
        assert!(!session.view_state().dragging);
    }

    #[test]
    fn test_pinch_release_while_marking_is_not_dragging() {
        let mut session = session_with(1);
        session.set_marking(true);
        session.handle(&InputEvent::PointerDown { pointer: 1, x: 500.0, y: 500.0, time_ms: 0 });
        session.handle(&InputEvent::PointerDown { pointer: 2, x: 600.0, y: 500.0, time_ms: 50 });
        session.handle(&InputEvent::PointerUp { pointer: 2 });

        assert!(session.is_marking());
        assert!(!session.view_state().dragging);
    }

    #[test]
    fn test_pinch_double_clamps_to_max() {
        let mut session = session_with(1);
        session.viewer.set_zoom(2.0);
        session.handle(&InputEvent::PointerDown { pointer: 1, x: 0.0, y: 0.0, time_ms: 0 });
        session.handle(&InputEvent::PointerDown { pointer: 2, x: 100.0, y: 0.0, time_ms: 0 });
        session.handle(&InputEvent::PointerMove { pointer: 2, x: 200.0, y: 0.0 });
        assert_eq!(session.view_state().zoom, MAX_ZOOM);
    }

    #[test]
    fn test_markers_stay_on_their_frame() {
        let mut session = session_with(3);
        session.set_marking(true);
        session.handle(&down(10.0, 10.0, 0));
        session.handle(&InputEvent::PointerUp { pointer: 0 });
        session.next_frame();
        assert!(session.current_markers().is_empty());
        session.previous_frame();
        assert_eq!(session.current_markers().len(), 1);
    }

    #[test]
    fn test_drag_rotates_when_not_marking() {
        let mut session = session_with(3);
        session.handle(&down(100.0, 0.0, 0));
        session.handle(&InputEvent::PointerMove { pointer: 0, x: 80.0, y: 0.0 });
        assert_eq!(session.view_state().frame, Some(1));
        session.handle(&InputEvent::PointerMove { pointer: 0, x: 60.0, y: 0.0 });
        assert_eq!(session.view_state().frame, Some(2));
        session.handle(&InputEvent::PointerMove { pointer: 0, x: 75.0, y: 0.0 });
        assert_eq!(session.view_state().frame, Some(1));
    }

    #[test]
    fn test_captured_frame_becomes_current() {
        let mut session = session_with(2);
        let index = session.add_captured(Frame::new("camera.jpg", "content://camera/1"));
        assert_eq!(index, 2);
        assert_eq!(session.view_state().frame, Some(2));
        assert!(session.current_markers().is_empty());
    }

    #[test]
    fn test_autoplay_requires_frames() {
        let mut empty = AnnotationSession::default();
        assert!(!empty.start_autoplay(0));

        let mut session = session_with(3);
        assert!(session.start_autoplay(0));
        assert_eq!(session.tick(900), 3);
        assert_eq!(session.view_state().frame, Some(0));
        assert_eq!(session.tick(1_200), 1);
        assert_eq!(session.view_state().frame, Some(1));
        session.stop_autoplay();
        assert_eq!(session.tick(5_000), 0);
    }

    #[test]
    fn test_toggle_marking_label() {
        let mut session = AnnotationSession::default();
        assert_eq!(session.marking_label(), "Marking: Off");
        assert!(session.toggle_marking());
        assert_eq!(session.marking_label(), "Marking: On");
    }

    #[test]
    fn test_snapshot_empty_session() {
        assert!(AnnotationSession::default().snapshot().is_none());
    }
}
