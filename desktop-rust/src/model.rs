use eframe::egui::{Color32, Pos2, Rect, Vec2};
use vehicle_annotator_common::{CanvasSize, Point};

/// 画像を表示領域に収めたキャンバスサイズ（ズーム1倍時）
pub fn fit_canvas(image_size: [usize; 2], available: Vec2) -> CanvasSize {
    let (w, h) = (image_size[0] as f32, image_size[1] as f32);
    if w <= 0.0 || h <= 0.0 || available.x <= 0.0 || available.y <= 0.0 {
        return CanvasSize::new(0.0, 0.0);
    }
    let scale = (available.x / w).min(available.y / h);
    CanvasSize::new(w * scale, h * scale)
}

/// ズーム後に画像を描く矩形（表示領域の中心基準）
pub fn display_rect(area: Rect, canvas: CanvasSize, zoom: f32) -> Rect {
    Rect::from_center_size(area.center(), Vec2::new(canvas.width, canvas.height) * zoom)
}

/// 画面座標 → キャンバス座標
pub fn screen_to_canvas(pos: Pos2, area: Rect, canvas: CanvasSize, zoom: f32) -> Point {
    let offset = (pos - area.center()) / zoom;
    let center = canvas.center();
    Point::new(center.x + offset.x, center.y + offset.y)
}

/// キャンバス座標 → 画面座標
pub fn canvas_to_screen(point: Point, area: Rect, canvas: CanvasSize, zoom: f32) -> Pos2 {
    let center = canvas.center();
    area.center() + Vec2::new(point.x - center.x, point.y - center.y) * zoom
}

pub fn marker_color(name: &str) -> Color32 {
    match name.trim().to_lowercase().as_str() {
        "green" => Color32::from_rgb(0, 128, 0),
        "lime" => Color32::from_rgb(0, 255, 0),
        "blue" => Color32::from_rgb(0, 0, 255),
        "yellow" => Color32::from_rgb(255, 255, 0),
        "orange" => Color32::from_rgb(255, 165, 0),
        "white" => Color32::WHITE,
        "black" => Color32::BLACK,
        _ => Color32::RED,
    }
}
