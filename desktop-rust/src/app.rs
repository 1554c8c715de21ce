use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};
use vehicle_annotator_common::{AnnotationSession, CanvasSize, Frame, InputEvent, Marker};

use crate::io::{decode_for_display, marks_path_for, write_marks_file, DecodedImage};
use crate::model::{canvas_to_screen, display_rect, fit_canvas, marker_color, screen_to_canvas};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
/// マウスのポインタID。タッチは 1 + TouchId
const MOUSE_POINTER: u64 = 0;

pub struct DesktopApp {
    session: AnnotationSession,
    started: Instant,
    /// 現在フレームの表示キャンバス（ズーム1倍）
    canvas: Option<CanvasSize>,
    status: String,
    save_status: String,
    save_rx: Option<Receiver<UiMessage>>,
    saving: bool,
    local_only: bool,
    textures: HashMap<String, egui::TextureHandle>,
    texture_sizes: HashMap<String, [usize; 2]>,
    texture_rx: Receiver<TextureData>,
    texture_tx: mpsc::Sender<TextureData>,
    texture_inflight: HashSet<String>,
    failed: HashSet<String>,
}

enum UiMessage {
    SaveDone { message: String },
}

struct TextureData {
    source: String,
    image: Result<DecodedImage, String>,
}

impl DesktopApp {
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn open_images(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return;
        };
        let frames: Vec<Frame> = paths
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                Frame::new(name, path.to_string_lossy())
            })
            .collect();
        let added = self.session.import_frames(frames);
        self.status = format!("Loaded {added} images");
    }

    /// 撮影済みの1枚を末尾に追加し、そのフレームを表示する
    fn add_captured_photo(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let index = self.session.add_captured(Frame::new(name, path.to_string_lossy()));
        self.status = format!("Captured photo added as frame {}", index + 1);
    }

    fn request_texture(&mut self, source: &str) {
        if self.textures.contains_key(source)
            || self.texture_inflight.contains(source)
            || self.failed.contains(source)
        {
            return;
        }
        self.texture_inflight.insert(source.to_string());
        let sender = self.texture_tx.clone();
        let source = source.to_string();

        std::thread::spawn(move || {
            let image = decode_for_display(std::path::Path::new(&source)).map_err(|err| format!("{err:#}"));
            let _ = sender.send(TextureData { source, image });
        });
    }

    fn save_current(&mut self) {
        let Some(snapshot) = self.session.snapshot() else {
            self.save_status = "No image loaded".to_string();
            return;
        };
        let Some(canvas) = self.canvas.filter(|c| !c.is_empty()) else {
            self.save_status = "Image is not displayed yet".to_string();
            return;
        };

        let source = PathBuf::from(&snapshot.frame.source);
        let marks_path = marks_path_for(&source);
        if let Err(err) = write_marks_file(&marks_path, &snapshot.markers) {
            self.save_status = format!("Save failed: {err}");
            return;
        }

        let cli = resolve_cli_binary();
        let canvas_arg = format!("{}x{}", canvas.width, canvas.height);
        let local_only = self.local_only;
        let (tx, rx) = mpsc::channel();
        self.save_rx = Some(rx);
        self.saving = true;
        self.save_status = "Saving...".to_string();

        std::thread::spawn(move || {
            let mut command = std::process::Command::new(cli);
            command.args([
                "annotate",
                source.to_string_lossy().as_ref(),
                "--marks-file",
                marks_path.to_string_lossy().as_ref(),
                "--canvas",
                canvas_arg.as_str(),
            ]);
            if local_only {
                command.arg("--no-upload");
            }

            let message = match command.output() {
                Ok(out) if out.status.success() => {
                    let stdout = String::from_utf8_lossy(&out.stdout);
                    let last = stdout.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("Saved");
                    last.trim().to_string()
                }
                Ok(out) => {
                    let stderr = String::from_utf8_lossy(&out.stderr);
                    format!("Save failed: {}", stderr.trim())
                }
                Err(err) => format!("Save failed: {err}"),
            };
            let _ = std::fs::remove_file(&marks_path);
            let _ = tx.send(UiMessage::SaveDone { message });
        });
    }

    fn poll_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.texture_rx.try_recv() {
            self.texture_inflight.remove(&msg.source);
            match msg.image {
                Ok(image) => {
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(image.size, &image.pixels);
                    let texture = ctx.load_texture(&msg.source, color_image, egui::TextureOptions::LINEAR);
                    self.texture_sizes.insert(msg.source.clone(), image.size);
                    self.textures.insert(msg.source, texture);
                }
                Err(err) => {
                    self.status = format!("Load failed: {err}");
                    self.failed.insert(msg.source);
                }
            }
        }

        if let Some(rx) = &self.save_rx {
            if let Ok(UiMessage::SaveDone { message }) = rx.try_recv() {
                self.save_status = message;
                self.saving = false;
                self.save_rx = None;
            }
        }
    }

    /// egui の入力を分類器向けイベントに変換
    fn collect_input(&self, ctx: &egui::Context, response: &egui::Response, area: egui::Rect, canvas: CanvasSize) -> Vec<InputEvent> {
        let zoom = self.session.view_state().zoom;
        let now = self.now_ms();
        let to_canvas = |pos: egui::Pos2| screen_to_canvas(pos, area, canvas, zoom);

        let (events, scroll) = ctx.input(|i| (i.events.clone(), i.raw_scroll_delta));
        // タッチ由来のポインタイベントは二重になるので捨てる
        let has_touch = events.iter().any(|e| matches!(e, egui::Event::Touch { .. }));

        let mut out = Vec::new();
        for event in events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    let pointer = 1 + id.0;
                    let p = to_canvas(pos);
                    match phase {
                        egui::TouchPhase::Start if area.contains(pos) => {
                            out.push(InputEvent::PointerDown { pointer, x: p.x, y: p.y, time_ms: now });
                        }
                        egui::TouchPhase::Move => out.push(InputEvent::PointerMove { pointer, x: p.x, y: p.y }),
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => out.push(InputEvent::PointerUp { pointer }),
                        _ => {}
                    }
                }
                egui::Event::PointerButton { pos, button: egui::PointerButton::Primary, pressed, .. } if !has_touch => {
                    if pressed && area.contains(pos) {
                        let p = to_canvas(pos);
                        out.push(InputEvent::PointerDown { pointer: MOUSE_POINTER, x: p.x, y: p.y, time_ms: now });
                    } else if !pressed {
                        out.push(InputEvent::PointerUp { pointer: MOUSE_POINTER });
                    }
                }
                egui::Event::PointerMoved(pos) if !has_touch => {
                    let p = to_canvas(pos);
                    out.push(InputEvent::PointerMove { pointer: MOUSE_POINTER, x: p.x, y: p.y });
                }
                _ => {}
            }
        }

        if response.hovered() && scroll.y != 0.0 {
            // egui は上スクロールが正
            out.push(InputEvent::Wheel { delta_y: -scroll.y });
        }
        if response.double_clicked() {
            out.push(InputEvent::DoubleClick);
        }
        out
    }

    fn render_viewer(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(frame) = self.session.viewer().current_frame().cloned() else {
            ui.centered_and_justified(|ui| {
                ui.label("Open images to start.");
            });
            return;
        };

        let (area, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let painter = ui.painter_at(area);
        painter.rect_filled(area, 0.0, Color32::from_gray(16));

        let Some(texture) = self.textures.get(&frame.source).cloned() else {
            self.request_texture(&frame.source);
            painter.text(area.center(), egui::Align2::CENTER_CENTER, "Loading...", egui::FontId::default(), Color32::GRAY);
            return;
        };
        let size = self.texture_sizes.get(&frame.source).copied().unwrap_or([1, 1]);
        let canvas = fit_canvas(size, area.size());
        self.canvas = Some(canvas);

        for event in self.collect_input(ctx, &response, area, canvas) {
            self.session.handle(&event);
        }

        let zoom = self.session.view_state().zoom;
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(texture.id(), display_rect(area, canvas, zoom), uv, Color32::WHITE);

        for entry in self.session.current_markers() {
            let marker: &Marker = &entry.marker;
            painter.circle_stroke(
                canvas_to_screen(marker.center(), area, canvas, zoom),
                marker.radius * zoom,
                egui::Stroke::new(2.0, marker_color(&marker.color)),
            );
        }
    }
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("cjk_fallback".to_string(), FontData::from_owned(data));
            for family in [FontFamily::Proportional, FontFamily::Monospace] {
                fonts.families.entry(family).or_default().push("cjk_fallback".to_string());
            }
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl Default for DesktopApp {
    fn default() -> Self {
        let (texture_tx, texture_rx) = mpsc::channel();
        Self {
            session: AnnotationSession::default(),
            started: Instant::now(),
            canvas: None,
            status: String::new(),
            save_status: String::new(),
            save_rx: None,
            saving: false,
            local_only: false,
            textures: HashMap::new(),
            texture_sizes: HashMap::new(),
            texture_rx,
            texture_tx,
            texture_inflight: HashSet::new(),
            failed: HashSet::new(),
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.saving || !self.texture_inflight.is_empty() {
            ctx.request_repaint();
        }
        self.poll_messages(ctx);

        if self.session.is_autoplaying() {
            self.session.tick(self.now_ms());
            ctx.request_repaint_after(Duration::from_millis(30));
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open Images").clicked() {
                    self.open_images();
                }
                if ui.button("Add Photo").clicked() {
                    self.add_captured_photo();
                }
                ui.separator();

                let has_frames = !self.session.viewer().is_empty();
                if ui.add_enabled(has_frames, egui::Button::new("◀")).clicked() {
                    self.session.previous_frame();
                }
                if ui.add_enabled(has_frames, egui::Button::new("▶")).clicked() {
                    self.session.next_frame();
                }

                let autoplay_label = if self.session.is_autoplaying() { "Stop Animation" } else { "Start Animation" };
                if ui.add_enabled(has_frames, egui::Button::new(autoplay_label)).clicked() {
                    if self.session.is_autoplaying() {
                        self.session.stop_autoplay();
                    } else {
                        let now = self.now_ms();
                        self.session.start_autoplay(now);
                    }
                }
                if ui.button("Reset Zoom").clicked() {
                    self.session.reset_zoom();
                }

                let marking = self.session.is_marking();
                let label = RichText::new(self.session.marking_label())
                    .color(if marking { Color32::from_rgb(246, 196, 69) } else { Color32::from_gray(200) });
                if ui.button(label).clicked() {
                    self.session.toggle_marking();
                }
                if ui.add_enabled(has_frames, egui::Button::new("Clear Marks")).clicked() {
                    self.session.clear_current_markers();
                }
                ui.separator();

                ui.checkbox(&mut self.local_only, "Local only");
                if ui.add_enabled(has_frames && !self.saving, egui::Button::new("Save")).clicked() {
                    self.save_current();
                }

                ui.separator();
                if !self.save_status.is_empty() {
                    ui.label(RichText::new(&self.save_status).color(Color32::from_rgb(246, 196, 69)));
                }
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::TopBottomPanel::bottom("state").show(ctx, |ui| {
            let state = self.session.view_state();
            let frame_label = match state.frame {
                Some(index) => format!("{} / {}", index + 1, self.session.viewer().len()),
                None => "-".to_string(),
            };
            ui.label(format!(
                "Frame {frame_label}   Zoom {:.1}x   Markers {}",
                state.zoom,
                self.session.current_markers().len()
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_viewer(ui, ctx);
        });
    }
}

fn resolve_cli_binary() -> PathBuf {
    let name = format!("vehicle-annotator{}", std::env::consts::EXE_SUFFIX);
    let exe = std::env::current_exe().ok();
    if let Some(base_dir) = exe.as_ref().and_then(|p| p.parent()) {
        let local = base_dir.join(&name);
        if local.exists() {
            return local;
        }
        if let Some(target_dir) = base_dir.parent() {
            for profile in ["debug", "release"] {
                let sibling = target_dir.join(profile).join(&name);
                if sibling.exists() {
                    return sibling;
                }
            }
        }
    }
    PathBuf::from("vehicle-annotator")
}
