//! 入力イベントの再生
//!
//! 記録したポインタ操作をセッションに流し、マーカー編集・回転・ズームを再現する。
//!
//! ```json
//! {
//!   "canvas": {"width": 800, "height": 600},
//!   "marking": true,
//!   "steps": [
//!     {"type": "pointerDown", "x": 50, "y": 50, "timeMs": 0},
//!     {"type": "pointerUp"},
//!     {"action": "toggleMarking"}
//!   ]
//! }
//! ```

use crate::error::{AnnotatorError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use vehicle_annotator_common::{AnnotationSession, CanvasSize, InputEvent, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplayAction {
    ToggleMarking,
    Next,
    Previous,
    ResetZoom,
    ClearMarkers,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayStep {
    Input(InputEvent),
    Action { action: ReplayAction },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayScript {
    pub canvas: CanvasSize,
    #[serde(default)]
    pub marking: bool,
    /// 開始フレーム
    #[serde(default)]
    pub frame: usize,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AnnotatorError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let script: ReplayScript = serde_json::from_str(&content)?;
        if script.canvas.is_empty() {
            return Err(AnnotatorError::InvalidMarker(format!(
                "キャンバスサイズが不正です: {}x{}",
                script.canvas.width, script.canvas.height
            )));
        }
        Ok(script)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub steps: usize,
    pub intents: usize,
    pub view: ViewState,
    pub markers_on_frame: usize,
}

/// スクリプトをセッションに適用
pub fn run(script: &ReplayScript, session: &mut AnnotationSession) -> Result<ReplayOutcome> {
    session.jump_to(script.frame)?;
    session.set_marking(script.marking);

    let mut intents = 0;
    for step in &script.steps {
        match step {
            ReplayStep::Input(event) => {
                intents += session.handle(event).len();
            }
            ReplayStep::Action { action } => apply_action(session, *action),
        }
    }

    let outcome = ReplayOutcome {
        steps: script.steps.len(),
        intents,
        view: session.view_state(),
        markers_on_frame: session.current_markers().len(),
    };
    debug!(?outcome, "replay finished");
    Ok(outcome)
}

fn apply_action(session: &mut AnnotationSession, action: ReplayAction) {
    match action {
        ReplayAction::ToggleMarking => {
            session.toggle_marking();
        }
        ReplayAction::Next => session.next_frame(),
        ReplayAction::Previous => session.previous_frame(),
        ReplayAction::ResetZoom => session.reset_zoom(),
        ReplayAction::ClearMarkers => {
            session.clear_current_markers();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vehicle_annotator_common::Frame;

    fn session(n: usize) -> AnnotationSession {
        let mut session = AnnotationSession::default();
        session.import_frames(
            (0..n).map(|i| Frame::new(format!("{}.jpg", i), format!("/p/{}.jpg", i))).collect(),
        );
        session
    }

    #[test]
    fn test_parse_mixed_steps() {
        let script: ReplayScript = serde_json::from_str(
            r#"{
                "canvas": {"width": 800, "height": 600},
                "steps": [
                    {"type": "wheel", "deltaY": -1},
                    {"action": "next"},
                    {"type": "doubleClick"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.steps[1], ReplayStep::Action { action: ReplayAction::Next });
        assert!(!script.marking);
    }

    #[test]
    fn test_place_then_double_tap_delete() {
        let script: ReplayScript = serde_json::from_str(
            r#"{
                "canvas": {"width": 300, "height": 300},
                "marking": true,
                "steps": [
                    {"type": "pointerDown", "x": 50, "y": 50, "timeMs": 1000},
                    {"type": "pointerUp"},
                    {"type": "pointerDown", "x": 50, "y": 50, "timeMs": 1200},
                    {"type": "pointerUp"}
                ]
            }"#,
        )
        .unwrap();
        let mut session = session(2);
        let outcome = run(&script, &mut session).unwrap();
        assert_eq!(outcome.markers_on_frame, 0);
        assert!(session.markers().is_empty());
    }

    #[test]
    fn test_rotate_and_zoom() {
        let script: ReplayScript = serde_json::from_str(
            r#"{
                "canvas": {"width": 300, "height": 300},
                "steps": [
                    {"type": "pointerDown", "x": 100, "y": 50, "timeMs": 0},
                    {"type": "pointerMove", "x": 80, "y": 50},
                    {"type": "pointerUp"},
                    {"type": "wheel", "deltaY": -120}
                ]
            }"#,
        )
        .unwrap();
        let mut session = session(3);
        let outcome = run(&script, &mut session).unwrap();
        assert_eq!(outcome.view.frame, Some(1));
        assert!((outcome.view.zoom - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_start_frame_out_of_range() {
        let script = ReplayScript {
            canvas: CanvasSize::new(10.0, 10.0),
            marking: false,
            frame: 5,
            steps: vec![],
        };
        assert!(run(&script, &mut session(2)).is_err());
    }
}
