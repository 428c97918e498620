use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{HEADER_BLUE, hex_color};
use crate::dashboard::Kpis;
use crate::data::filter::FilterDimension;
use crate::data::model::FilteredView;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in FilterDimension::ALL {
                // Clone so we can mutate state inside the loop.
                let values = state.options.values(dim).to_vec();
                let n_selected = state.selection.selected(dim).map_or(0, |s| s.len());
                let header_text = format!("{}  ({n_selected}/{})", dim.label(), values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                                changed = true;
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                                changed = true;
                            }
                        });

                        for val in &values {
                            let mut checked = state.selection.is_selected(dim, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(dim, val);
                                changed = true;
                            }
                        }
                    });
            }
        });

    if changed {
        ui.ctx().request_repaint();
    }
}

// ---------------------------------------------------------------------------
// Page furniture
// ---------------------------------------------------------------------------

/// Title banner across the top of the page.
pub fn header(ui: &mut Ui) {
    egui::Frame::group(ui.style())
        .fill(hex_color(HEADER_BLUE))
        .stroke(egui::Stroke::NONE)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new("🦜 Bird Observation Dashboard")
                        .size(28.0)
                        .strong()
                        .color(Color32::WHITE),
                );
            });
        });
    ui.add_space(8.0);
}

/// The three headline counters.
pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Observations", kpis.total_observations);
        metric(&mut cols[1], "Unique Species", kpis.unique_species);
        metric(&mut cols[2], "Observers", kpis.observers);
    });
    ui.add_space(8.0);
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    egui::Frame::group(ui.style())
        .fill(Color32::WHITE)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(label).color(Color32::DARK_GRAY));
            ui.label(RichText::new(value.to_string()).size(30.0).strong());
        });
}

pub fn footer(ui: &mut Ui) {
    ui.add_space(12.0);
    ui.separator();
    ui.label(RichText::new("📌 Dashboard generated with egui: Bird Monitoring Data Analysis").italics());
}

/// Full-window message when the dataset could not be loaded.
pub fn load_error(ui: &mut Ui, message: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading(RichText::new("Could not load the observation data").color(Color32::RED));
        ui.add_space(8.0);
        ui.label(message);
        ui.add_space(8.0);
        ui.label("Pass a different file with --data or BIRD_DASHBOARD_DATA.");
    });
}

// ---------------------------------------------------------------------------
// Filtered records preview
// ---------------------------------------------------------------------------

/// Collapsible table with the first filtered rows.
pub fn records_preview(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let view = FilteredView::new(ds, &state.visible_indices);
    let shown = view.len().min(state.preview_rows);

    ui.add_space(8.0);
    egui::CollapsingHeader::new(RichText::new("🗂 Filtered Records").strong())
        .id_salt("records_preview")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("Showing {shown} of {} matching observations", view.len()));
            ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .vscroll(false)
                    .columns(Column::auto().at_least(60.0), ds.columns.len())
                    .header(20.0, |mut header| {
                        for name in &ds.columns {
                            header.col(|ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(18.0, shown, |mut row| {
                            let observation = &ds.rows[view.indices[row.index()]];
                            for col in 0..ds.columns.len() {
                                row.col(|ui| {
                                    ui.label(observation.get(col).to_string());
                                });
                            }
                        });
                    });
            });
        });
}
