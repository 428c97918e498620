mod app;
mod color;
mod config;
mod dashboard;
mod data;
mod state;
mod ui;

use std::path::Path;

use anyhow::{Context, Result};
use app::BirdDashboardApp;
use clap::Parser;
use eframe::egui;

use config::Args;
use dashboard::DashboardSnapshot;
use data::cache::DatasetCache;
use data::filter::{FilterOptions, FilterSelection, filtered_indices};
use data::model::FilteredView;
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cache = DatasetCache::new(&args.data);

    if let Some(out) = &args.export {
        return export_snapshot(&cache, out);
    }

    // Load eagerly so a bad file is reported before the first frame.
    let state = AppState::from_cache(&cache, args.preview_rows);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bird Observation Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BirdDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}

/// Compute the dashboard with every filter value selected and write it as JSON.
fn export_snapshot(cache: &DatasetCache, out: &Path) -> Result<()> {
    let table = cache.get()?;
    let options = FilterOptions::from_table(&table);
    let indices = filtered_indices(&table, &FilterSelection::all(&options));
    let snapshot = DashboardSnapshot::compute(&FilteredView::new(&table, &indices));

    let json = serde_json::to_string_pretty(&snapshot).context("serializing dashboard")?;
    std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
    log::info!(
        "Exported {} charts for {} observations to {}",
        snapshot.charts().count(),
        snapshot.kpis.total_observations,
        out.display()
    );
    Ok(())
}
