// src/app.rs
use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;

use crate::detector::HandDetector;
use crate::hand::HandSample;
use crate::shapes::{Mesh, Shape};
use crate::tracker::{GestureTracker, TrackerConfig, Transform};
use crate::video::CameraSource;
use crate::viewport::{CameraPreview, Theme, Viewport};

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub camera_index: u32,
    pub damping_factor: f32,
    pub shape_resolution: u32,
    pub mesh_path: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            damping_factor: 0.2,
            shape_resolution: 20,
            mesh_path: PathBuf::from("assets/diamond.obj"),
        }
    }
}

pub struct HandformApp {
    // Frame pipeline
    camera: Option<CameraSource>,
    detector: HandDetector,
    tracker: GestureTracker,

    // Per-frame results
    current_hands: Vec<HandSample>,
    current_transform: Transform,

    // Scene
    shape: Shape,
    custom_mesh: Option<Mesh>,

    // UI
    viewport: Viewport,
    preview: CameraPreview,
    show_settings: bool,
    settings: AppSettings,
}

impl HandformApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::default();

        let camera = match CameraSource::new(settings.camera_index) {
            Ok(camera) => {
                let (width, height) = camera.resolution();
                tracing::info!(width, height, "capture resolution");
                Some(camera)
            }
            Err(e) => {
                tracing::warn!("no camera available: {e:#}");
                None
            }
        };

        let custom_mesh = match Mesh::load(&settings.mesh_path) {
            Ok(mesh) => {
                tracing::info!(
                    path = %settings.mesh_path.display(),
                    vertices = mesh.vertex_count(),
                    faces = mesh.face_count(),
                    "custom mesh loaded"
                );
                Some(mesh)
            }
            Err(e) => {
                tracing::warn!("could not load custom mesh: {e}");
                None
            }
        };

        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.config_mut().damping_factor = settings.damping_factor;

        Self {
            camera,
            detector: HandDetector::create(),
            tracker,
            current_hands: Vec::new(),
            current_transform: Transform {
                position: nalgebra::Vector3::zeros(),
                scale: 1.0,
                rotation_deg: 0.0,
            },
            shape: Shape::Cube,
            custom_mesh,
            viewport: Viewport::new(Theme::default()),
            preview: CameraPreview::new(),
            show_settings: false,
            settings,
        }
    }

    fn handle_shape_keys(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Num1) {
                self.select_shape(1);
            } else if i.key_pressed(egui::Key::Num2) {
                self.select_shape(2);
            } else if i.key_pressed(egui::Key::Num3) {
                self.select_shape(3);
            } else if i.key_pressed(egui::Key::Num4) {
                self.select_shape(4);
            }
        });
    }

    fn select_shape(&mut self, selector: u8) {
        let resolution = self.settings.shape_resolution;
        self.shape = match selector {
            1 => Shape::Cube,
            2 => Shape::Sphere { resolution },
            3 => Shape::Cone { resolution },
            4 => match &self.custom_mesh {
                Some(mesh) => Shape::Custom(mesh.clone()),
                None => {
                    tracing::warn!("no custom mesh loaded, keeping current shape");
                    return;
                }
            },
            // Unmapped selectors are ignored.
            _ => return,
        };
        tracing::debug!(shape = self.shape.label(), "shape selected");
    }

    /// One iteration of the frame pipeline: capture, detect, track.
    fn step(&mut self, ctx: &egui::Context) {
        let frame = match &mut self.camera {
            Some(camera) => match camera.read_frame() {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::warn!("frame capture failed: {e:#}");
                    None
                }
            },
            None => None,
        };

        if let Some(frame) = &frame {
            self.preview.update_frame(ctx, frame);
        }

        self.current_hands = self.detector.detect(frame.as_ref());
        self.current_transform = self.tracker.update(&self.current_hands);

        // More than two reported hands is treated as a detector glitch:
        // the tracker already fell back to idle, so skip the overlay too.
        if self.current_hands.len() > 2 {
            self.current_hands.clear();
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            egui::menu::bar(ui, |ui| {
                ui.heading("Handform");
                ui.separator();
                ui.label("Shape [1-4]:");
                for (selector, label) in
                    [(1u8, "Cube"), (2, "Sphere"), (3, "Cone"), (4, "Mesh")]
                {
                    let selected = self.shape.label() == label;
                    if ui.selectable_label(selected, label).clicked() {
                        self.select_shape(selector);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn render_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("status")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("Camera");
                self.preview.show(ui, &self.viewport.theme);
                if self.detector.is_simulated() {
                    ui.colored_label(
                        egui::Color32::from_rgb(255, 152, 0),
                        "Simulated hands (detector offline)",
                    );
                }

                ui.separator();
                ui.heading("Tracking");
                let state = self.tracker.state();
                ui.label(format!("Hands detected: {}", self.current_hands.len()));
                ui.colored_label(
                    self.viewport.theme.text_primary,
                    if state.calibrated {
                        "Calibration: done"
                    } else {
                        "Calibration: hold index finger near center"
                    },
                );
                ui.label(format!(
                    "Position: ({:.2}, {:.2}, {:.2})",
                    state.position.x, state.position.y, state.position.z
                ));
                ui.label(format!("Scale: {:.3}", state.scale));
                ui.label(format!("Rotation: {:.1}°", state.rotation_deg));

                ui.separator();
                ui.label(
                    egui::RichText::new(
                        "One hand moves the shape, two hands pinch to scale \
                         and tilt vertically to rotate.",
                    )
                    .color(self.viewport.theme.text_secondary),
                );
            });
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Damping Factor:");
                if ui
                    .add(
                        egui::Slider::new(&mut self.settings.damping_factor, 0.01..=0.9)
                            .step_by(0.01),
                    )
                    .changed()
                {
                    self.tracker.config_mut().damping_factor = self.settings.damping_factor;
                }

                ui.label("Wireframe Resolution:");
                if ui
                    .add(egui::Slider::new(
                        &mut self.settings.shape_resolution,
                        4..=60,
                    ))
                    .changed()
                {
                    self.shape.set_resolution(self.settings.shape_resolution);
                }

                ui.separator();
                ui.label("Custom Mesh:");
                ui.label(self.settings.mesh_path.display().to_string());
            });
        self.show_settings = open;
    }
}

impl eframe::App for HandformApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shape_keys(ctx);
        self.step(ctx);

        self.render_header(ctx);
        self.render_side_panel(ctx);
        if self.show_settings {
            self.render_settings_window(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewport
                .show(ui, &self.shape, &self.current_transform, &self.current_hands);
        });

        // Frame-rate throttle, not a scheduling guarantee.
        ctx.request_repaint_after(Duration::from_millis(10));
    }
}
