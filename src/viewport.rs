// src/viewport.rs - Wireframe viewport: projects world-space segments through
// a fixed perspective camera onto the egui painter.
use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use image::DynamicImage;
use nalgebra::{Rotation3, Vector3};

use crate::hand::{HandSample, HAND_CONNECTIONS};
use crate::shapes::Shape;
use crate::tracker::Transform;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color32,
    pub surface: Color32,
    pub wireframe: Color32,
    pub axis_x: Color32,
    pub axis_y: Color32,
    pub axis_z: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(20, 20, 25),
            surface: Color32::from_rgb(30, 30, 35),
            wireframe: Color32::from_rgb(128, 204, 255),
            axis_x: Color32::from_rgb(244, 67, 54),
            axis_y: Color32::from_rgb(70, 130, 240),
            axis_z: Color32::from_rgb(76, 175, 80),
            text_primary: Color32::WHITE,
            text_secondary: Color32::from_rgb(200, 200, 200),
        }
    }
}

// Fixed camera: 45 degree vertical fov, scene pushed 5 units from the eye.
const FOV_Y_DEG: f32 = 45.0;
const CAMERA_DISTANCE: f32 = 5.0;
const NEAR_PLANE: f32 = 0.1;

pub struct Viewport {
    pub theme: Theme,
}

impl Viewport {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Draw one frame: axes gizmo, skeleton overlays for every detected
    /// hand, and the selected shape under the tracker transform.
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        shape: &Shape,
        transform: &Transform,
        hands: &[HandSample],
    ) {
        let (rect, _response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, egui::Rounding::same(8.0), self.theme.background);

        self.draw_axes(&painter, rect, transform.rotation_deg);
        for hand in hands {
            self.draw_skeleton(&painter, rect, hand);
        }
        self.draw_shape(&painter, rect, shape, transform);
    }

    fn draw_shape(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        shape: &Shape,
        transform: &Transform,
    ) {
        let rotation =
            Rotation3::from_axis_angle(&Vector3::y_axis(), transform.rotation_deg.to_radians());
        let stroke = Stroke::new(1.5, self.theme.wireframe);
        for [a, b] in shape.edges() {
            let a = transform.position + rotation * (a * transform.scale);
            let b = transform.position + rotation * (b * transform.scale);
            self.line(painter, rect, a, b, stroke);
        }
    }

    fn draw_skeleton(&self, painter: &egui::Painter, rect: Rect, hand: &HandSample) {
        // Mirror the normalized landmarks and recenter them in the view so
        // the skeleton lines up with the mirrored camera preview.
        let adjust = |lm: &crate::hand::Landmark| {
            Vector3::new(-lm.x + 0.5, -lm.y, -lm.z)
        };

        let stroke = Stroke::new(2.0, self.theme.wireframe);
        for &(a, b) in HAND_CONNECTIONS.iter() {
            self.line(
                painter,
                rect,
                adjust(&hand.landmarks[a]),
                adjust(&hand.landmarks[b]),
                stroke,
            );
        }
        for lm in &hand.landmarks {
            if let Some(pos) = self.project(rect, adjust(lm)) {
                painter.circle_filled(pos, 2.0, self.theme.wireframe);
            }
        }
    }

    fn draw_axes(&self, painter: &egui::Painter, rect: Rect, rotation_deg: f32) {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation_deg.to_radians());
        let origin = Vector3::new(-2.3, -1.8, 0.0);
        let scale = 0.3;

        let arrows: [(Vector3<f32>, [Vector3<f32>; 2], Color32); 3] = [
            (
                Vector3::x(),
                [Vector3::new(0.9, 0.1, 0.0), Vector3::new(0.9, -0.1, 0.0)],
                self.theme.axis_x,
            ),
            (
                Vector3::y(),
                [Vector3::new(0.1, 0.9, 0.0), Vector3::new(-0.1, 0.9, 0.0)],
                self.theme.axis_y,
            ),
            (
                Vector3::z(),
                [Vector3::new(0.1, 0.1, 0.9), Vector3::new(-0.1, -0.1, 0.9)],
                self.theme.axis_z,
            ),
        ];

        for (tip, barbs, color) in arrows {
            let place = |v: Vector3<f32>| origin + rotation * (v * scale);
            let stroke = Stroke::new(1.5, color);
            self.line(painter, rect, place(Vector3::zeros()), place(tip), stroke);
            for barb in barbs {
                self.line(painter, rect, place(tip), place(barb), stroke);
            }
        }
    }

    fn line(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        a: Vector3<f32>,
        b: Vector3<f32>,
        stroke: Stroke,
    ) {
        if let (Some(a), Some(b)) = (self.project(rect, a), self.project(rect, b)) {
            painter.line_segment([a, b], stroke);
        }
    }

    /// Perspective-project a world-space point into the viewport rect.
    /// Returns None for points on the near side of the clip plane.
    fn project(&self, rect: Rect, point: Vector3<f32>) -> Option<Pos2> {
        let view_z = point.z - CAMERA_DISTANCE;
        if view_z > -NEAR_PLANE {
            return None;
        }
        let f = 1.0 / (FOV_Y_DEG.to_radians() / 2.0).tan();
        let aspect = rect.width() / rect.height();
        let ndc_x = (f / aspect) * point.x / -view_z;
        let ndc_y = f * point.y / -view_z;
        Some(Pos2::new(
            rect.center().x + ndc_x * rect.width() / 2.0,
            rect.center().y - ndc_y * rect.height() / 2.0,
        ))
    }
}

/// Camera preview widget: uploads the latest frame as a texture and draws
/// it with a fixed aspect ratio.
pub struct CameraPreview {
    texture: Option<egui::TextureHandle>,
    aspect_ratio: f32,
}

impl CameraPreview {
    pub fn new() -> Self {
        Self {
            texture: None,
            aspect_ratio: 4.0 / 3.0,
        }
    }

    pub fn update_frame(&mut self, ctx: &egui::Context, frame: &DynamicImage) {
        let size = [frame.width() as usize, frame.height() as usize];
        self.aspect_ratio = frame.width() as f32 / frame.height() as f32;
        let rgba = frame.to_rgba8();
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, Default::default()),
            None => {
                self.texture = Some(ctx.load_texture("camera_frame", color_image, Default::default()))
            }
        }
    }

    pub fn show(&self, ui: &mut egui::Ui, theme: &Theme) {
        let width = ui.available_width();
        let size = Vec2::new(width, width / self.aspect_ratio);
        let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());

        if let Some(texture) = &self.texture {
            ui.painter().image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        } else {
            ui.painter()
                .rect_filled(rect, egui::Rounding::same(4.0), theme.surface);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No Video Signal",
                egui::FontId::proportional(16.0),
                theme.text_secondary,
            );
        }
    }
}
