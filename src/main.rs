// src/main.rs
mod app;
mod detector;
mod hand;
mod shapes;
mod tracker;
mod video;
mod viewport;

use eframe::egui;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // List available cameras up front; saves guessing when index 0 is wrong.
    match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
        Ok(cameras) => {
            tracing::info!("found {} camera(s)", cameras.len());
            for (i, camera) in cameras.iter().enumerate() {
                tracing::info!("  [{}] {}", i, camera.human_name());
            }
        }
        Err(e) => {
            tracing::warn!("failed to query cameras: {}", e);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([960.0, 600.0]),
        centered: true,
        ..Default::default()
    };

    let result = eframe::run_native(
        "Handform",
        options,
        Box::new(|cc| {
            cc.egui_ctx
                .set_visuals(create_visuals(&viewport::Theme::default()));
            Box::new(app::HandformApp::new(cc))
        }),
    );

    if let Err(e) = result {
        eprintln!("Error running application: {:?}", e);
    }
}

/// Derive the egui widget visuals from the viewport theme so the palette
/// lives in one place.
fn create_visuals(theme: &viewport::Theme) -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = theme.background;
    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = lighten(theme.surface, 15);
    visuals.widgets.hovered.bg_fill = lighten(theme.surface, 28);
    visuals.widgets.active.bg_fill = theme.axis_y;

    visuals.widgets.noninteractive.rounding = egui::Rounding::same(8.0);
    visuals.widgets.inactive.rounding = egui::Rounding::same(8.0);
    visuals.widgets.hovered.rounding = egui::Rounding::same(8.0);
    visuals.widgets.active.rounding = egui::Rounding::same(8.0);

    visuals.window_rounding = egui::Rounding::same(12.0);
    visuals.menu_rounding = egui::Rounding::same(8.0);

    visuals
}

fn lighten(color: egui::Color32, amount: u8) -> egui::Color32 {
    egui::Color32::from_rgb(
        color.r().saturating_add(amount),
        color.g().saturating_add(amount),
        color.b().saturating_add(amount),
    )
}
