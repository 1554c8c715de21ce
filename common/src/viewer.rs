//! フレームビューア
//!
//! 画像列・現在フレーム・ズーム倍率を保持する。
//! ナビゲーション/ズーム変更のたびに再描画要求カウンタを進める。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 3.0;

/// フレーム（画像参照）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// 並び替えに使うファイル名
    pub name: String,
    /// パスまたはURI
    pub source: String,
}

impl Frame {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { name: name.into(), source: source.into() }
    }
}

#[derive(Debug, Clone)]
pub struct FrameViewer {
    frames: Vec<Frame>,
    current: usize,
    zoom: f32,
    render_requests: u64,
}

impl Default for FrameViewer {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            current: 0,
            zoom: MIN_ZOOM,
            render_requests: 0,
        }
    }
}

pub fn clamp_zoom(value: f32) -> f32 {
    if value.is_nan() {
        return MIN_ZOOM;
    }
    value.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl FrameViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1枚追加。空だった場合はフレーム0が現在フレームになる
    pub fn append(&mut self, frame: Frame) -> usize {
        let was_empty = self.frames.is_empty();
        self.frames.push(frame);
        if was_empty {
            self.current = 0;
            self.request_render();
        }
        self.frames.len() - 1
    }

    /// 複数枚をファイル名順に追加
    ///
    /// 初回取り込みならフレーム0、既存フレームがあれば最後に追加した画像を表示する。
    pub fn append_batch(&mut self, mut frames: Vec<Frame>) -> std::ops::Range<usize> {
        let start = self.frames.len();
        if frames.is_empty() {
            return start..start;
        }
        frames.sort_by(|a, b| a.name.cmp(&b.name));
        self.frames.extend(frames);
        self.current = if start == 0 { 0 } else { self.frames.len() - 1 };
        self.request_render();
        start..self.frames.len()
    }

    pub fn next(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.frames.len();
        self.request_render();
    }

    pub fn previous(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.current = (self.current + self.frames.len() - 1) % self.frames.len();
        self.request_render();
    }

    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.frames.len() {
            return Err(Error::FrameOutOfRange { index, len: self.frames.len() });
        }
        self.current = index;
        self.request_render();
        Ok(())
    }

    pub fn set_zoom(&mut self, value: f32) -> f32 {
        self.zoom = clamp_zoom(value);
        self.request_render();
        self.zoom
    }

    /// 倍率を掛ける（ピンチ）
    pub fn zoom_by(&mut self, factor: f32) -> f32 {
        self.set_zoom(self.zoom * factor)
    }

    /// 倍率を加算（ホイール）
    pub fn zoom_step(&mut self, delta: f32) -> f32 {
        self.set_zoom(self.zoom + delta)
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(MIN_ZOOM);
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.current)
    }

    pub fn current_index(&self) -> Option<usize> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// これまでの再描画要求数
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// マーカー編集など、ナビゲーション以外の再描画要求
    pub fn request_render(&mut self) {
        self.render_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer_with(n: usize) -> FrameViewer {
        let mut viewer = FrameViewer::new();
        for i in 0..n {
            viewer.append(Frame::new(format!("{}.jpg", i), format!("/tmp/{}.jpg", i)));
        }
        viewer
    }

    #[test]
    fn test_first_append_becomes_current() {
        let mut viewer = FrameViewer::new();
        assert!(viewer.current_frame().is_none());
        viewer.append(Frame::new("a.jpg", "a.jpg"));
        assert_eq!(viewer.current_index(), Some(0));
    }

    #[test]
    fn test_next_cycles_with_length() {
        let mut viewer = viewer_with(3);
        for _ in 0..3 {
            viewer.next();
        }
        assert_eq!(viewer.current_index(), Some(0));
        viewer.next();
        assert_eq!(viewer.current_index(), Some(1));
    }

    #[test]
    fn test_previous_inverts_next() {
        let mut viewer = viewer_with(5);
        viewer.previous();
        assert_eq!(viewer.current_index(), Some(4));
        viewer.next();
        assert_eq!(viewer.current_index(), Some(0));
    }

    #[test]
    fn test_navigation_on_empty_is_noop() {
        let mut viewer = FrameViewer::new();
        viewer.next();
        viewer.previous();
        assert_eq!(viewer.current_index(), None);
        assert_eq!(viewer.render_requests(), 0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut viewer = viewer_with(1);
        assert_eq!(viewer.set_zoom(10.0), MAX_ZOOM);
        assert_eq!(viewer.set_zoom(-1.0), MIN_ZOOM);
        assert_eq!(viewer.set_zoom(f32::NAN), MIN_ZOOM);
        for _ in 0..100 {
            viewer.zoom_by(1.7);
        }
        assert_eq!(viewer.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_batch_sorted_by_name() {
        let mut viewer = FrameViewer::new();
        viewer.append_batch(vec![
            Frame::new("c.jpg", "c"),
            Frame::new("a.jpg", "a"),
            Frame::new("b.jpg", "b"),
        ]);
        let names: Vec<_> = viewer.frames().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(viewer.current_index(), Some(0));
    }

    #[test]
    fn test_second_batch_shows_last_added() {
        let mut viewer = viewer_with(2);
        let range = viewer.append_batch(vec![Frame::new("z.jpg", "z"), Frame::new("y.jpg", "y")]);
        assert_eq!(range, 2..4);
        assert_eq!(viewer.current_frame().unwrap().name, "z.jpg");
    }

    #[test]
    fn test_every_change_requests_render() {
        let mut viewer = viewer_with(2);
        let before = viewer.render_requests();
        viewer.next();
        viewer.zoom_step(0.1);
        viewer.reset_zoom();
        assert_eq!(viewer.render_requests(), before + 3);
    }

    #[test]
    fn test_jump_to_out_of_range() {
        let mut viewer = viewer_with(2);
        assert!(viewer.jump_to(1).is_ok());
        assert!(matches!(
            viewer.jump_to(2),
            Err(Error::FrameOutOfRange { index: 2, len: 2 })
        ));
    }
}
