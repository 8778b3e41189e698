//! Interactive 3-D pipe screensaver built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`PipeSpawner`] and an
//! [`OrbitCamera`] and implements [`eframe::App`] to draw the pipes and
//! expose the population settings through an egui UI.

use crate::{
    camera::{OrbitCamera, Projector},
    fps::FpsCounter,
};
use eframe::App;
use glam::{Vec2, Vec3};
use pipe_core::{
    bounds::Bounds,
    config::{Material, SpawnerConfig},
    pipe::PipeBranch,
    spawner::PipeSpawner,
};

/// Upper end of the "active pipes" slider.
const MAX_DESIRED: usize = 8;
/// Upper end of the "max on screen" slider.
const MAX_ON_SCREEN: usize = 12;
const SPEED_RANGE: std::ops::RangeInclusive<f32> = 1.0..=40.0;

/// Share of the colour kept on faces turned away from the light.
const AMBIENT: f32 = 0.35;

/// Longest simulation step taken in one frame, in seconds.
const MAX_FRAME_DT: f32 = 0.1;

/// Population settings used by the viewer: the default population in a
/// volume sized for the camera's orbit.
pub fn scene_config() -> SpawnerConfig {
    SpawnerConfig {
        bounds: Bounds::from_size(Vec3::ZERO, Vec3::splat(60.0)),
        ..SpawnerConfig::default()
    }
}

/// One projected face, ready to fill.
#[derive(Clone, Debug)]
pub struct FacePolygon {
    /// Corners in viewport pixels.
    pub points: Vec<Vec2>,
    /// Mean view depth of the corners.
    pub depth: f32,
    pub color: egui::Color32,
}

/// Lambert-shaded face colour with the branch opacity as alpha.
///
/// ### Parameters
/// - `material` - Base colour of the face.
/// - `normal` - Outward unit normal of the face.
/// - `light` - Unit direction pointing towards the light.
/// - `opacity` - Branch opacity in `[0, 1]`.
pub fn shade(material: Material, normal: Vec3, light: Vec3, opacity: f32) -> egui::Color32 {
    let lambert = normal.dot(light).max(0.0);
    let k = AMBIENT + (1.0 - AMBIENT) * lambert;
    let [r, g, b, a] = material.color;
    let channel = |c: u8| (c as f32 * k).round().clamp(0.0, 255.0) as u8;
    let alpha = (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    egui::Color32::from_rgba_unmultiplied(channel(r), channel(g), channel(b), alpha)
}

/// Projects every front-facing face of `branches`, sorted back to front.
///
/// Faces turned away from the eye, faces with a corner behind the camera
/// and fully transparent branches are skipped.
pub fn face_polygons<'a>(
    branches: impl IntoIterator<Item = &'a PipeBranch>,
    projector: &Projector,
    light: Vec3,
) -> Vec<FacePolygon> {
    let eye = projector.eye();
    let mut polygons = Vec::new();

    for branch in branches {
        let opacity = branch.opacity();
        if opacity <= 0.0 {
            continue;
        }
        let mesh = branch.mesh();

        for (id, face) in mesh.faces.iter().enumerate() {
            let normal = mesh.compute_face_normal(id);
            let corners: Vec<Vec3> = mesh.face_points(id).collect();
            if corners.len() < 3 {
                continue;
            }
            let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
            if normal.dot(eye - center) <= 0.0 {
                continue;
            }

            let Some(projected) = corners
                .iter()
                .map(|&p| projector.project(p))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };

            let depth = projected.iter().map(|(_, d)| d).sum::<f32>() / projected.len() as f32;
            polygons.push(FacePolygon {
                points: projected.into_iter().map(|(p, _)| p).collect(),
                depth,
                color: shade(face.material, normal, light, opacity),
            });
        }
    }

    polygons.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    polygons
}

/// Main application state for the screensaver.
///
/// The typical per-frame update is:
/// 1. Handle keyboard input (Space toggles pause).
/// 2. Call [`Viewer::step`] with the frame delta.
/// 3. Render the status bar, the settings window and the pipes.
///
/// ### Fields
/// - `spawner` - The pipe population being simulated.
/// - `camera` - Orbit camera around the pipe volume.
/// - `fps` - Rolling frame-rate average for the status bar.
/// - `light` - Unit direction towards the light.
///
/// - `settings_rect` - Where the settings window was drawn last frame.
/// - `ignore_drag` - Set while a drag that began over the settings window
///   is held, so it does not orbit the camera.
pub struct Viewer {
    spawner: PipeSpawner,
    camera: OrbitCamera,
    fps: FpsCounter,
    light: Vec3,

    settings_rect: Option<egui::Rect>,
    ignore_drag: bool,
}

impl Viewer {
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            spawner: PipeSpawner::new(config),
            camera: OrbitCamera::default(),
            fps: FpsCounter::new(),
            light: Vec3::new(0.4, 1.0, 0.6).normalize(),
            settings_rect: None,
            ignore_drag: false,
        }
    }

    /// Advances the simulation and the idle camera by `dt` seconds.
    fn step(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.spawner.tick(dt);
        if !self.spawner.is_paused() {
            self.camera.idle(dt);
        }
    }

    fn set_desired_active(&mut self, desired: usize) {
        self.spawner.set_desired_active(desired.clamp(1, MAX_DESIRED));
    }

    fn set_max_on_screen(&mut self, max: usize) {
        let lo = self.spawner.config().desired_active;
        self.spawner.set_max_on_screen(max.clamp(lo, MAX_ON_SCREEN.max(lo)));
    }

    fn set_speed(&mut self, speed: f32) {
        self.spawner
            .set_speed(speed.clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end()));
    }

    /// Builds the bottom status bar (fps, population counters).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("fps (30f) = {:.2}", self.fps.fps()));
                ui.separator();
                ui.label(format!("objects = {}", self.spawner.forest().len()));
                ui.label(format!("finished = {}", self.spawner.finished_count()));
                ui.label(format!("active = {}", self.spawner.active_count()));
            });
        });
    }

    /// Builds the floating settings window.
    fn ui_settings_window(&mut self, ctx: &egui::Context) {
        let shown = egui::Window::new("Settings")
            .default_pos(egui::pos2(10.0, 10.0))
            .resizable(false)
            .show(ctx, |ui| {
                let cfg = *self.spawner.config();

                let mut desired = cfg.desired_active;
                ui.add(egui::Slider::new(&mut desired, 1..=MAX_DESIRED).text("Active pipes"));
                if desired != cfg.desired_active {
                    self.set_desired_active(desired);
                }

                let lo = self.spawner.config().desired_active;
                let mut max = self.spawner.config().max_on_screen;
                ui.add(
                    egui::Slider::new(&mut max, lo..=MAX_ON_SCREEN.max(lo)).text("Max on screen"),
                );
                if max != self.spawner.config().max_on_screen {
                    self.set_max_on_screen(max);
                }

                let mut speed = cfg.pipe_speed;
                ui.add(egui::Slider::new(&mut speed, SPEED_RANGE).text("Speed"));
                if speed != cfg.pipe_speed {
                    self.set_speed(speed);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui
                        .button(if self.spawner.is_paused() { "▶ Resume" } else { "⏸ Pause" })
                        .clicked()
                    {
                        self.spawner.toggle_pause();
                    }
                    if ui.button("Reset").clicked() {
                        self.spawner.reset();
                    }
                });

                ui.separator();
                ui.label("Space: pause / resume");
                ui.label("Drag: orbit, scroll: zoom");
            });

        self.settings_rect = shown.map(|inner| inner.response.rect);
    }

    /// Builds the central panel where the pipes are drawn and the camera
    /// is controlled.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::from_gray(18)))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
                let rect = response.rect;
                let painter = ui.painter_at(rect);

                // Drags that start on the settings window never orbit.
                let (pressed, released, press_pos) = ctx.input(|i| {
                    (
                        i.pointer.primary_pressed(),
                        i.pointer.primary_released(),
                        i.pointer.press_origin(),
                    )
                });
                if pressed {
                    self.ignore_drag = press_pos
                        .zip(self.settings_rect)
                        .is_some_and(|(p, r)| r.contains(p));
                }
                if response.dragged() && !self.ignore_drag {
                    let delta = response.drag_delta();
                    self.camera.drag(Vec2::new(delta.x, delta.y));
                }
                if released {
                    self.ignore_drag = false;
                }

                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 && response.hovered() {
                    self.camera.scroll(scroll);
                }

                let size = Vec2::new(rect.width(), rect.height());
                let projector = self.camera.projector(size);
                for polygon in face_polygons(self.spawner.branches(), &projector, self.light) {
                    let points = polygon
                        .points
                        .iter()
                        .map(|p| rect.min + egui::vec2(p.x, p.y))
                        .collect();
                    painter.add(egui::Shape::convex_polygon(
                        points,
                        polygon.color,
                        egui::Stroke::NONE,
                    ));
                }

                if self.spawner.is_paused() {
                    painter.text(
                        rect.center_top() + egui::vec2(0.0, 40.0),
                        egui::Align2::CENTER_CENTER,
                        "PAUSED",
                        egui::FontId::proportional(32.0),
                        egui::Color32::WHITE,
                    );
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that advances the simulation and builds the UI for
    /// each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (dt, frame_dt, space) = ctx.input(|i| {
            (
                i.stable_dt,
                i.unstable_dt,
                i.key_pressed(egui::Key::Space),
            )
        });
        if space {
            self.spawner.toggle_pause();
        }
        self.fps.push(frame_dt);
        self.step(dt);

        self.ui_status_bar(ctx);
        self.ui_settings_window(ctx);
        self.ui_central_panel(ctx);

        ctx.request_repaint();
    }
}
