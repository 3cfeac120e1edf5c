//! Windowed viewer for the particle field
//!
//! egui plays the external collaborators: its repaint callback is the frame
//! clock, its pointer state feeds the frame input, and the finished pixel
//! buffer is uploaded as a texture filling the window.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use pointfield_core::{FrameStats, SharedFrameInput, Simulation, SimulationConfig};

pub fn open(config: SimulationConfig) -> Result<()> {
    let sim = Simulation::new(&config).context("failed to set up the simulation")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("pointfield")
            .with_inner_size([config.width as f32, config.height as f32]),
        ..Default::default()
    };

    eframe::run_native(
        "pointfield",
        options,
        Box::new(move |_cc| Ok(Box::new(FieldApp::new(sim)))),
    )
    .map_err(|e| anyhow!("viewer failed: {}", e))
}

/// Field viewer application
pub struct FieldApp {
    sim: Simulation,
    input: Arc<SharedFrameInput>,
    texture: Option<egui::TextureHandle>,
    last_stats: FrameStats,
    last_error: Option<String>,
}

impl FieldApp {
    pub fn new(sim: Simulation) -> Self {
        let input = sim.input();
        Self {
            sim,
            input,
            texture: None,
            last_stats: FrameStats::default(),
            last_error: None,
        }
    }

    /// Match the pixel buffer to the drawable area.
    fn sync_surface(&mut self, rect: egui::Rect) {
        let width = rect.width().round().max(1.0) as usize;
        let height = rect.height().round().max(1.0) as usize;
        if width == self.sim.pixels().width() && height == self.sim.pixels().height() {
            return;
        }
        match self.sim.resize(width, height) {
            Ok(()) => self.last_error = None,
            Err(e) => {
                log::error!("resize to {}x{} failed: {}", width, height, e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Publish the latest pointer sample relative to the surface origin.
    fn capture_pointer(&self, ctx: &egui::Context, origin: egui::Pos2) {
        let (pos, down) = ctx.input(|i| (i.pointer.latest_pos(), i.pointer.primary_down()));
        if let Some(pos) = pos {
            self.input.set_pointer(pos.x - origin.x, pos.y - origin.y);
        }
        self.input.set_pressed(down);
    }

    fn upload(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let pixels = self.sim.pixels();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [pixels.width(), pixels.height()],
            pixels.as_bytes(),
        );
        match &mut self.texture {
            Some(texture) => {
                texture.set(image, egui::TextureOptions::NEAREST);
                texture.id()
            }
            None => {
                let texture = ctx.load_texture("field", image, egui::TextureOptions::NEAREST);
                let id = texture.id();
                self.texture = Some(texture);
                id
            }
        }
    }
}

impl eframe::App for FieldApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let rect = ctx.available_rect();
        self.sync_surface(rect);
        self.capture_pointer(ctx, rect.min);

        let now_ms = ctx.input(|i| i.time) * 1000.0;
        self.last_stats = self.sim.frame(now_ms);
        let texture_id = self.upload(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter();
                painter.image(
                    texture_id,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let status = match &self.last_error {
                    Some(error) => format!("Error: {}", error),
                    None => format!(
                        "{} on surface, {} off",
                        self.last_stats.painted, self.last_stats.skipped
                    ),
                };
                painter.text(
                    rect.min + egui::vec2(8.0, 8.0),
                    egui::Align2::LEFT_TOP,
                    status,
                    egui::FontId::monospace(12.0),
                    egui::Color32::GRAY,
                );
            });

        // Continuous animation
        ctx.request_repaint();
    }
}
