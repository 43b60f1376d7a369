//! Interactive 3D space-colonization tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] and an orbit
//! camera, and implements [`eframe::App`] to draw read-only snapshots of the
//! simulation (tube mesh wireframe, branch segments, attractor markers and
//! the crown sphere) with a simple orthographic projection.

use std::f32::consts::{PI, TAU};

use eframe::App;
use glam::{Quat, Vec3};
use sca3d_core::{
    GrowthConfig, Simulation,
    engine::{StepKind, StepReport},
};

/// Latitude/longitude resolution of the debug crown sphere.
const SPHERE_LAT: usize = 10;
const SPHERE_LONG: usize = 16;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running`, feed the frame time to [`Simulation::tick`] and orbit
///    the camera.
/// 3. Render the enabled layers from the simulation's snapshots.
///
/// ### Fields
/// - `sim` - The running simulation.
/// - `draft` - Configuration being edited in the side panel; applied on demand.
/// - `seed` - Seed of the current attractor cloud.
///
/// - `running` - Whether the simulation is auto-advancing.
/// - `zoom` - Pixels per world unit.
/// - `yaw` / `pitch` - Orbit camera angles (radians).
/// - `orbit_speed` - Automatic yaw speed while running (radians per second).
///
/// - `last_report` - Report of the latest growth step, for the status bar.
/// - `error` - Last configuration error, shown until the next successful apply.
pub struct Viewer {
    sim: Simulation,
    draft: GrowthConfig,
    seed: u64,

    running: bool,
    zoom: f32,
    yaw: f32,
    pitch: f32,
    orbit_speed: f32,

    show_mesh: bool,
    show_branches: bool,
    show_attractors: bool,
    show_sphere: bool,

    sphere_lines: Vec<(Vec3, Vec3)>,

    last_report: Option<StepReport>,
    error: Option<String>,
}

impl Viewer {
    /// Creates a viewer over a fresh simulation.
    ///
    /// An invalid `cfg` is reported in the status bar and replaced by
    /// [`GrowthConfig::default`].
    pub fn new(cfg: GrowthConfig) -> Self {
        let seed = rand::random();
        let (sim, error) = match Simulation::new(cfg, Vec3::ZERO, seed) {
            Ok(sim) => (sim, None),
            Err(e) => {
                log::warn!("{e}, falling back to defaults");
                let sim = Simulation::new(GrowthConfig::default(), Vec3::ZERO, seed)
                    .expect("default configuration is valid");
                (sim, Some(e.to_string()))
            }
        };
        let draft = *sim.config();

        Self {
            sphere_lines: sphere_wireframe(draft.radius, SPHERE_LAT, SPHERE_LONG),
            sim,
            draft,
            seed,
            running: false,
            zoom: 40.0,
            yaw: 0.0,
            pitch: 0.3,
            orbit_speed: 0.2,
            show_mesh: true,
            show_branches: false,
            show_attractors: true,
            show_sphere: false,
            last_report: None,
            error,
        }
    }

    /// Regrows the tree from a new attractor cloud, keeping the configuration.
    fn reset(&mut self) {
        self.seed = rand::random();
        // The current config already passed validation.
        if let Err(e) = self.sim.reset(self.seed) {
            self.error = Some(e.to_string());
        }
        self.last_report = None;
        self.running = false;
    }

    /// Rebuilds the simulation from the edited configuration.
    ///
    /// On a validation error the running simulation is left untouched and
    /// the error is kept for display.
    fn apply_draft(&mut self) {
        match Simulation::new(self.draft, Vec3::ZERO, self.seed) {
            Ok(sim) => {
                self.sim = sim;
                self.sphere_lines = sphere_wireframe(self.draft.radius, SPHERE_LAT, SPHERE_LONG);
                self.last_report = None;
                self.error = None;
            }
            Err(e) => {
                log::warn!("rejected configuration: {e}");
                self.error = Some(e.to_string());
            }
        }
    }

    fn step_once(&mut self) {
        self.last_report = Some(self.sim.step());
    }

    fn advance(&mut self, dt: f32) {
        if let Some(report) = self.sim.tick(dt) {
            self.last_report = Some(report);
        }
        self.yaw = (self.yaw + self.orbit_speed * dt).rem_euclid(TAU);
    }

    /// Projects a world-space position to screen-space.
    ///
    /// The camera orbits the world origin: the point is rotated by `-yaw`
    /// around +Y, then by `pitch` around +X, and the resulting X/Y are
    /// scaled by `zoom` around the rect center. Screen y grows downward.
    fn world_to_screen(&self, p: Vec3, rect: egui::Rect) -> egui::Pos2 {
        let view = Quat::from_rotation_x(self.pitch) * Quat::from_rotation_y(-self.yaw);
        let v = view * p;
        let center = rect.center();
        egui::pos2(center.x + v.x * self.zoom, center.y - v.y * self.zoom)
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, layers, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    self.step_once();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.checkbox(&mut self.show_mesh, "Mesh");
                ui.checkbox(&mut self.show_branches, "Branches");
                ui.checkbox(&mut self.show_attractors, "Attractors");
                ui.checkbox(&mut self.show_sphere, "Crown");

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 5.0..=200.0).text("Zoom"));
                ui.add(egui::Slider::new(&mut self.orbit_speed, -1.0..=1.0).text("Orbit"));
            });
        });
    }

    /// Builds the bottom status bar (seed, branch and attractor counts, last step).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("seed = {}", self.seed));
                ui.separator();
                ui.label(format!("progress = {:.2}", self.sim.progress()));
                ui.label(format!("branches = {}", self.sim.branches().len()));
                let attractors = self.sim.attractors();
                ui.label(format!(
                    "attractors = {} ({} active)",
                    attractors.count(),
                    attractors.active.len()
                ));
                if let Some(report) = &self.last_report {
                    ui.separator();
                    ui.label(describe_report(report));
                }
                if let Some(err) = &self.error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
        });
    }

    /// Builds the right-hand panel editing the growth configuration.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Attractors");
                Self::labeled_drag_usize(
                    ui,
                    "attractor_count:",
                    &mut self.draft.attractor_count,
                    0..=3000,
                    1.0,
                );
                Self::labeled_drag_f32(ui, "radius:", &mut self.draft.radius, 0.0..=10.0, 0.05);
                Self::labeled_drag_f32(
                    ui,
                    "attraction_range:",
                    &mut self.draft.attraction_range,
                    0.0..=3.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "kill_range:",
                    &mut self.draft.kill_range,
                    0.0..=2.0,
                    0.01,
                );

                ui.separator();
                ui.label("Growth");
                Self::labeled_drag_f32(
                    ui,
                    "branch_length:",
                    &mut self.draft.branch_length,
                    0.0..=0.5,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "interval (s):",
                    &mut self.draft.time_between_iterations,
                    0.0..=1.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "random_growth:",
                    &mut self.draft.random_growth,
                    0.0..=0.2,
                    0.005,
                );

                ui.label("Start position");
                let start = &mut self.draft.start_position;
                Self::labeled_drag_f32(ui, "x:", &mut start.x, -10.0..=10.0, 0.05);
                Self::labeled_drag_f32(ui, "y:", &mut start.y, -10.0..=10.0, 0.05);
                Self::labeled_drag_f32(ui, "z:", &mut start.z, -10.0..=10.0, 0.05);

                ui.separator();
                ui.label("Mesh");
                Self::labeled_drag_usize(
                    ui,
                    "radial_subdivisions:",
                    &mut self.draft.radial_subdivisions,
                    0..=20,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "extremity_size:",
                    &mut self.draft.extremity_size,
                    0.0..=1.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "growth_exponent:",
                    &mut self.draft.growth_exponent,
                    0.0..=5.0,
                    0.05,
                );

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        self.apply_draft();
                    }
                    if ui.button("Defaults").clicked() {
                        self.draft = GrowthConfig::default();
                    }
                });
            });
    }

    /// Builds the central panel where the simulation is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Drag to orbit manually.
            if response.dragged() {
                let delta = response.drag_delta();
                self.yaw = (self.yaw - delta.x * 0.01).rem_euclid(TAU);
                self.pitch = (self.pitch + delta.y * 0.01).clamp(-PI / 2.0, PI / 2.0);
            }

            if ui.ctx().input(|i| i.raw_scroll_delta.y != 0.0) {
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(5.0, 200.0);
            }

            if self.running {
                let dt = ctx.input(|i| i.stable_dt);
                self.advance(dt);
                ctx.request_repaint();
            }

            let origin = self.sim.origin();

            if self.show_sphere {
                let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 60, 140));
                for &(a, b) in &self.sphere_lines {
                    painter.line_segment(
                        [
                            self.world_to_screen(origin + a, rect),
                            self.world_to_screen(origin + b, rect),
                        ],
                        stroke,
                    );
                }
            }

            if self.show_mesh {
                let mesh = self.sim.mesh();
                let stroke = egui::Stroke::new(0.5, egui::Color32::from_rgb(150, 110, 70));
                for [a, b, c] in mesh.triangles() {
                    let pa = self.world_to_screen(origin + mesh.vertices[a as usize], rect);
                    let pb = self.world_to_screen(origin + mesh.vertices[b as usize], rect);
                    let pc = self.world_to_screen(origin + mesh.vertices[c as usize], rect);
                    painter.add(egui::Shape::closed_line(vec![pa, pb, pc], stroke));
                }
            }

            if self.show_branches {
                for seg in self.sim.branches().segments() {
                    let a = self.world_to_screen(seg.start, rect);
                    let b = self.world_to_screen(seg.end, rect);
                    painter
                        .line_segment([a, b], egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN));
                    painter.circle_filled(b, 1.5, egui::Color32::from_rgb(200, 0, 200));
                }
            }

            if self.show_attractors {
                let attractors = self.sim.attractors();
                for (i, &p) in attractors.positions.iter().enumerate() {
                    let color = if attractors.is_active(i) {
                        egui::Color32::YELLOW
                    } else {
                        egui::Color32::LIGHT_RED
                    };
                    painter.circle_filled(self.world_to_screen(p, rect), 2.0, color);
                }
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

fn describe_report(report: &StepReport) -> String {
    match report.kind {
        StepKind::Attracted => format!(
            "last step: +{} toward {} attractors",
            report.spawned.len(),
            report.active
        ),
        StepKind::Continued => format!("last step: +{} continuing", report.spawned.len()),
        StepKind::Stalled => "last step: stalled (no attractors left)".to_string(),
    }
}

/// Line segments of a latitude/longitude sphere centered at the origin.
///
/// `n_lat` rings of `n_long` points each sit strictly between the poles;
/// every point is linked to its neighbor on the same ring and to the point
/// above it, and the top and bottom rings are linked to the poles.
pub fn sphere_wireframe(radius: f32, n_lat: usize, n_long: usize) -> Vec<(Vec3, Vec3)> {
    if n_lat == 0 || n_long == 0 {
        return Vec::new();
    }

    let point = |lat: usize, lon: usize| -> Vec3 {
        let alpha = lon as f32 / n_long as f32 * TAU;
        let theta = (lat + 1) as f32 / (n_lat + 1) as f32 * PI;
        Vec3::new(
            radius * alpha.cos() * theta.sin(),
            radius * theta.cos(),
            radius * alpha.sin() * theta.sin(),
        )
    };
    let top = Vec3::new(0.0, radius, 0.0);
    let bottom = Vec3::new(0.0, -radius, 0.0);

    let mut lines = Vec::with_capacity(n_long * (2 * n_lat + 1));
    for lon in 0..n_long {
        lines.push((top, point(0, lon)));
        lines.push((point(n_lat - 1, lon), bottom));
        for lat in 0..n_lat {
            lines.push((point(lat, lon), point(lat, (lon + 1) % n_long)));
            if lat > 0 {
                lines.push((point(lat - 1, lon), point(lat, lon)));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn small_cfg() -> GrowthConfig {
        GrowthConfig {
            attractor_count: 100,
            radius: 2.0,
            ..GrowthConfig::default()
        }
    }

    #[test]
    fn origin_projects_to_rect_center() {
        let mut viewer = Viewer::new(small_cfg());
        viewer.yaw = 1.2;
        viewer.pitch = 0.4;
        let rect = test_rect();
        let p = viewer.world_to_screen(Vec3::ZERO, rect);
        assert!((p - rect.center()).length() < 1e-4);
    }

    #[test]
    fn front_view_keeps_up_pointing_up() {
        let mut viewer = Viewer::new(small_cfg());
        viewer.yaw = 0.0;
        viewer.pitch = 0.0;
        viewer.zoom = 10.0;
        let rect = test_rect();

        let up = viewer.world_to_screen(Vec3::Y, rect);
        assert!((up.x - rect.center().x).abs() < 1e-4);
        assert!((up.y - (rect.center().y - 10.0)).abs() < 1e-4);
    }

    #[test]
    fn yaw_orbits_around_the_vertical_axis() {
        let mut viewer = Viewer::new(small_cfg());
        viewer.pitch = 0.0;
        viewer.zoom = 10.0;
        let rect = test_rect();

        viewer.yaw = 0.0;
        let a = viewer.world_to_screen(Vec3::X, rect);
        viewer.yaw = PI;
        let b = viewer.world_to_screen(Vec3::X, rect);

        // Half an orbit mirrors the point across the vertical screen axis.
        assert!((a.x - rect.center().x - 10.0).abs() < 1e-3);
        assert!((b.x - rect.center().x + 10.0).abs() < 1e-3);
    }

    #[test]
    fn invalid_draft_keeps_running_simulation() {
        let mut viewer = Viewer::new(small_cfg());
        viewer.step_once();
        let branches = viewer.sim.branches().len();

        viewer.draft.radial_subdivisions = 2;
        viewer.apply_draft();

        assert!(viewer.error.is_some());
        assert_eq!(viewer.sim.branches().len(), branches);
        assert_eq!(viewer.sim.config().radial_subdivisions, 10);
    }

    #[test]
    fn valid_draft_rebuilds_simulation() {
        let mut viewer = Viewer::new(small_cfg());
        viewer.step_once();

        viewer.draft.radial_subdivisions = 4;
        viewer.apply_draft();

        assert!(viewer.error.is_none());
        assert_eq!(viewer.sim.branches().len(), 1);
        assert_eq!(viewer.sim.mesh().vertices.len(), 2 * 4);
        assert!(viewer.last_report.is_none());
    }

    #[test]
    fn invalid_startup_config_falls_back_to_defaults() {
        let viewer = Viewer::new(GrowthConfig {
            branch_length: 0.0,
            ..small_cfg()
        });
        assert!(viewer.error.is_some());
        assert_eq!(viewer.sim.config(), &GrowthConfig::default());
    }

    #[test]
    fn reset_restores_basic_state() {
        let mut viewer = Viewer::new(small_cfg());
        for _ in 0..3 {
            viewer.step_once();
        }
        viewer.running = true;

        viewer.reset();

        assert_eq!(viewer.sim.branches().len(), 1);
        assert_eq!(viewer.sim.attractors().count(), 100);
        assert!(viewer.last_report.is_none());
        assert!(!viewer.running);
    }

    #[test]
    fn advance_orbits_the_camera() {
        let mut viewer = Viewer::new(small_cfg());
        viewer.orbit_speed = 0.5;
        viewer.yaw = 0.0;
        viewer.advance(0.1);
        assert!((viewer.yaw - 0.05).abs() < 1e-6);
    }

    #[test]
    fn sphere_wireframe_lies_on_the_sphere() {
        let lines = sphere_wireframe(3.0, 4, 6);
        // Per meridian: 2 pole links, 4 ring links, 3 links between rings.
        assert_eq!(lines.len(), 6 * (2 + 4 + 3));
        for (a, b) in lines {
            assert!((a.length() - 3.0).abs() < 1e-4);
            assert!((b.length() - 3.0).abs() < 1e-4);
        }
        assert!(sphere_wireframe(1.0, 0, 5).is_empty());
    }
}
