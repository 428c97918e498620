use eframe::egui;

use crate::color::{PAGE_BACKGROUND, SIDEBAR_BLUE, hex_color};
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BirdDashboardApp {
    pub state: AppState,
}

impl BirdDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BirdDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply last frame's filter edits before anything is drawn.
        self.state.refresh();

        // ---- Load failure: nothing but the error ----
        if let Some(err) = &self.state.load_error {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::load_error(ui, err);
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).fill(hex_color(SIDEBAR_BLUE)))
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(hex_color(PAGE_BACKGROUND)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        panels::header(ui);
                        if let Some(snapshot) = &self.state.snapshot {
                            panels::kpi_row(ui, &snapshot.kpis);
                            for section in &snapshot.sections {
                                charts::section(ui, section);
                            }
                        }
                        panels::records_preview(ui, &self.state);
                        panels::footer(ui);
                    });
            });
    }
}
