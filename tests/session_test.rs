//! 注釈セッションのシナリオテスト
//!
//! ポインタ操作からフレーム・ズーム・マーカーまでを通しで検証

use vehicle_annotator_common::{
    AnnotationSession, Frame, InputEvent, Intent, Marker, Point, MAX_ZOOM, MIN_ZOOM,
};

fn session_with(names: &[&str]) -> AnnotationSession {
    let mut session = AnnotationSession::default();
    session.import_frames(
        names
            .iter()
            .map(|name| Frame::new(*name, format!("/photos/{}", name)))
            .collect(),
    );
    session
}

fn down(pointer: u64, x: f32, y: f32, time_ms: u64) -> InputEvent {
    InputEvent::PointerDown { pointer, x, y, time_ms }
}

fn mv(pointer: u64, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove { pointer, x, y }
}

fn up(pointer: u64) -> InputEvent {
    InputEvent::PointerUp { pointer }
}

/// 3枚取り込み → フレーム0。3回で一周し、4回目はフレーム1
#[test]
fn test_navigation_wraps_modulo_length() {
    let mut session = session_with(&["c.jpg", "a.jpg", "b.jpg"]);
    assert_eq!(session.view_state().frame, Some(0));
    assert_eq!(session.viewer().current_frame().unwrap().name, "a.jpg");

    for _ in 0..3 {
        session.next_frame();
    }
    assert_eq!(session.view_state().frame, Some(0));

    session.next_frame();
    assert_eq!(session.view_state().frame, Some(1));

    session.previous_frame();
    session.previous_frame();
    assert_eq!(session.view_state().frame, Some(2));
}

/// マーキング中: クリックで追加、400ms以内の再クリックで削除
#[test]
fn test_click_then_double_click_deletes() {
    let mut session = session_with(&["a.jpg"]);
    session.set_marking(true);

    session.handle(&down(0, 50.0, 50.0, 10_000));
    session.handle(&up(0));
    assert_eq!(session.current_markers().len(), 1);
    assert_eq!(session.current_markers()[0].marker, Marker::new(50.0, 50.0, 30.0, "red"));

    let intents = session.handle(&down(0, 50.0, 50.0, 10_250));
    session.handle(&up(0));
    assert!(matches!(intents.as_slice(), [Intent::DeleteMarker(_)]));
    assert!(session.current_markers().is_empty());
    assert!(session.markers().is_empty());
}

/// 400ms以上空けると削除ではなくドラッグ
#[test]
fn test_slow_second_click_drags() {
    let mut session = session_with(&["a.jpg"]);
    session.set_marking(true);

    session.handle(&down(0, 50.0, 50.0, 0));
    session.handle(&up(0));

    session.handle(&down(0, 55.0, 50.0, 1_000));
    assert!(session.view_state().dragging);
    session.handle(&mv(0, 120.0, 90.0));
    let intents = session.handle(&up(0));
    assert_eq!(intents, vec![Intent::EndDrag]);

    let marker = &session.current_markers()[0].marker;
    assert_eq!((marker.x, marker.y, marker.radius), (120.0, 90.0, 30.0));
    assert_eq!(marker.color, "red");
}

/// タイマーはマーカー単位ではなくキャンバス全体で共有される
#[test]
fn test_double_tap_timer_is_global() {
    let mut session = session_with(&["a.jpg"]);
    session.set_marking(true);
    session.add_marker(Marker::new(200.0, 200.0, 30.0, "red"));

    // 空白をタップして新規追加した直後に、別の既存マーカーをタップ
    session.handle(&down(0, 10.0, 10.0, 5_000));
    session.handle(&up(0));
    session.handle(&down(0, 200.0, 200.0, 5_100));
    session.handle(&up(0));

    assert!(session.marker_at(Point::new(200.0, 200.0)).is_none());
    assert_eq!(session.current_markers().len(), 1);
}

/// 2本指の距離が2倍 → ズーム2倍、さらに2倍で上限3に張り付く
#[test]
fn test_pinch_doubling_clamps() {
    let mut session = session_with(&["a.jpg"]);
    session.handle(&down(1, 100.0, 100.0, 0));
    session.handle(&down(2, 200.0, 100.0, 0));

    session.handle(&mv(2, 300.0, 100.0));
    assert!((session.view_state().zoom - 2.0).abs() < 1e-5);

    session.handle(&mv(2, 500.0, 100.0));
    assert_eq!(session.view_state().zoom, MAX_ZOOM);

    session.handle(&up(2));
    session.handle(&up(1));
    session.handle(&InputEvent::DoubleClick);
    assert_eq!(session.view_state().zoom, MIN_ZOOM);
}

/// ホイールを何回回しても [1,3] に収まる
#[test]
fn test_wheel_stays_in_range() {
    let mut session = session_with(&["a.jpg"]);
    for _ in 0..50 {
        session.handle(&InputEvent::Wheel { delta_y: -100.0 });
    }
    assert_eq!(session.view_state().zoom, MAX_ZOOM);
    for _ in 0..50 {
        session.handle(&InputEvent::Wheel { delta_y: 100.0 });
    }
    assert_eq!(session.view_state().zoom, MIN_ZOOM);
}

/// マーキング中は横移動で回転しない
#[test]
fn test_marking_blocks_rotation() {
    let mut session = session_with(&["a.jpg", "b.jpg"]);
    session.set_marking(true);
    session.handle(&down(0, 10.0, 10.0, 0));
    session.handle(&mv(0, 200.0, 10.0));
    session.handle(&up(0));
    assert_eq!(session.view_state().frame, Some(0));
}

/// マーカーはフレーム番号に紐づく。フレーム追加で既存番号の付け替えは起きない
#[test]
fn test_markers_keyed_by_frame_index() {
    let mut session = session_with(&["a.jpg", "b.jpg"]);
    session.add_marker(Marker::new(1.0, 1.0, 30.0, "red"));

    let index = session.add_captured(Frame::new("capture.jpg", "content://camera/1"));
    assert_eq!(index, 2);
    assert_eq!(session.view_state().frame, Some(2));
    assert!(session.current_markers().is_empty());
    assert_eq!(session.markers().markers_for(0).len(), 1);
}

/// 自動回転: 300msごとに1フレーム
#[test]
fn test_autoplay_ticks() {
    let mut session = session_with(&["a.jpg", "b.jpg", "c.jpg"]);
    assert!(session.start_autoplay(1_000));
    assert_eq!(session.tick(1_299), 0);
    assert_eq!(session.tick(1_300), 1);
    assert_eq!(session.view_state().frame, Some(1));
    assert_eq!(session.tick(1_900), 2);
    assert_eq!(session.view_state().frame, Some(0));

    session.stop_autoplay();
    assert_eq!(session.tick(10_000), 0);
    assert!(!AnnotationSession::default().start_autoplay(0));
}
