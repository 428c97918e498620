use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Points};

use crate::color::{ColorMap, palette_colors};
use crate::dashboard::{ChartData, ChartKind, ChartSnapshot, Coloring, Reduction, SectionSnapshot};
use crate::data::aggregate::{CategoryCount, HistogramBin, ScatterPoint};
use crate::data::model::FieldValue;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Sections and cards
// ---------------------------------------------------------------------------

/// One thematic section: a heading and its charts side by side.
pub fn section(ui: &mut Ui, section: &SectionSnapshot) {
    ui.add_space(12.0);
    ui.heading(RichText::new(section.title).strong());
    ui.add_space(4.0);
    ui.columns(section.charts.len().max(1), |cols| {
        for (col, chart) in cols.iter_mut().zip(&section.charts) {
            chart_card(col, chart);
        }
    });
}

fn chart_card(ui: &mut Ui, chart: &ChartSnapshot) {
    egui::Frame::group(ui.style())
        .fill(Color32::WHITE)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(chart.title).strong().size(15.0));
            if let Some(issue) = &chart.issue {
                ui.label(RichText::new(issue.to_string()).italics().small().color(Color32::GRAY));
            }
            match (&chart.data, chart.kind) {
                (ChartData::Categories(counts), ChartKind::Pie) => pie_chart(ui, chart, counts),
                (ChartData::Categories(counts), _) => bar_chart(ui, chart, counts),
                (ChartData::Points(points), _) => scatter_chart(ui, chart, points),
                (ChartData::Bins(bins), _) => histogram_chart(ui, chart, bins),
            }
        });
}

/// Colour per category, or the palette's first colour for everything.
fn category_colors<'a>(coloring: Coloring, labels: impl IntoIterator<Item = &'a FieldValue>) -> ColorMap {
    match coloring {
        Coloring::PerCategory(hexes) => ColorMap::new(labels, &palette_colors(hexes)),
        Coloring::Uniform(hexes) => {
            let first = palette_colors(&hexes[..hexes.len().min(1)]);
            ColorMap::new(labels, &first)
        }
    }
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, chart: &ChartSnapshot, counts: &[CategoryCount]) {
    let spec = chart.spec;
    let colors = category_colors(spec.coloring, counts.iter().map(|c| &c.label));
    // The hour view sits on a numeric axis; the others are positional.
    let numeric_x = matches!(spec.reduction, Reduction::CountByHour { .. });

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let x = if numeric_x { c.label.as_f64().unwrap_or(i as f64) } else { i as f64 };
            Bar::new(x, c.value as f64)
                .width(0.7)
                .name(c.label.to_string())
                .fill(colors.color_for(&c.label))
        })
        .collect();

    let mut plot = Plot::new(chart.id)
        .height(CHART_HEIGHT)
        .x_axis_label(spec.x_label)
        .y_axis_label(spec.y_label)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    if !numeric_x {
        let labels: Vec<String> = counts.iter().map(|c| c.label.to_string()).collect();
        plot = plot.x_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if v < 0.0 || (v - v.round()).abs() > 1e-6 {
                return String::new();
            }
            labels.get(v.round() as usize).cloned().unwrap_or_default()
        });
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).name(spec.y_label));
    });
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

fn histogram_chart(ui: &mut Ui, chart: &ChartSnapshot, bins: &[HistogramBin]) {
    let spec = chart.spec;
    let fill = match spec.coloring {
        Coloring::Uniform(hexes) | Coloring::PerCategory(hexes) => {
            palette_colors(hexes).first().copied().unwrap_or(Color32::GRAY)
        }
    };

    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.1} to {:.1}", b.start, b.end))
                .fill(fill)
                .stroke(Stroke::new(1.0, Color32::WHITE))
        })
        .collect();

    Plot::new(chart.id)
        .height(CHART_HEIGHT)
        .x_axis_label(spec.x_label)
        .y_axis_label(spec.y_label)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(spec.x_label));
        });
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

/// Marker radius in points, area-proportional to `size`.
fn marker_radius(size: f64, max_size: f64) -> f32 {
    if max_size <= 0.0 || size <= 0.0 {
        return 2.0;
    }
    2.0 + 8.0 * (size / max_size).sqrt() as f32
}

fn scatter_chart(ui: &mut Ui, chart: &ChartSnapshot, points: &[ScatterPoint]) {
    let spec = chart.spec;

    let mut groups: Vec<&FieldValue> = Vec::new();
    for p in points {
        if !groups.contains(&&p.group) {
            groups.push(&p.group);
        }
    }
    let colors = category_colors(spec.coloring, groups.iter().copied());
    let max_size = points.iter().map(|p| p.size).fold(0.0, f64::max);

    // egui_plot gives every series a single radius, so bucket by group and
    // half-point radius steps.
    let mut series: BTreeMap<(usize, u32), Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        let group = groups.iter().position(|g| *g == &p.group).unwrap_or(0);
        let bucket = (marker_radius(p.size, max_size) * 2.0).round() as u32;
        series.entry((group, bucket)).or_default().push([p.x, p.y]);
    }

    let hover: Vec<(f64, f64, String, String)> = points
        .iter()
        .map(|p| (p.x, p.y, p.hover.clone(), p.group.to_string()))
        .collect();
    let (x_label, y_label) = (spec.x_label, spec.y_label);

    Plot::new(chart.id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .label_formatter(move |_name, value: &PlotPoint| {
            let nearest = hover.iter().min_by(|a, b| {
                let da = (a.0 - value.x).powi(2) + (a.1 - value.y).powi(2);
                let db = (b.0 - value.x).powi(2) + (b.1 - value.y).powi(2);
                da.total_cmp(&db)
            });
            match nearest {
                Some((x, y, species, group)) => {
                    format!("{species}\n{x_label}: {x}\n{y_label}: {y}\nSeason: {group}")
                }
                None => String::new(),
            }
        })
        .show(ui, |plot_ui| {
            for ((group, bucket), pts) in series {
                let label = groups.get(group).map(|g| g.to_string()).unwrap_or_default();
                let color = groups
                    .get(group)
                    .map(|g| colors.color_for(g))
                    .unwrap_or(Color32::GRAY);
                plot_ui.points(
                    Points::new(pts)
                        .radius(bucket as f32 / 2.0)
                        .color(color.gamma_multiply(0.8))
                        .name(label),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart (painter-drawn; egui_plot has no pie)
// ---------------------------------------------------------------------------

/// Triangle-fan outline of an arc no wider than a quarter turn, so the
/// polygon stays convex.
fn wedge(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Pos2> {
    let steps = ((sweep / 0.05).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let a = start + sweep * i as f32 / steps as f32;
        points.push(center + radius * egui::vec2(a.cos(), a.sin()));
    }
    points
}

/// Which slice contains the angle `rel`, measured clockwise from 12 o'clock.
fn slice_at(fractions: &[f32], rel: f32) -> Option<usize> {
    let mut acc = 0.0;
    for (i, f) in fractions.iter().enumerate() {
        acc += f * TAU;
        if rel < acc {
            return Some(i);
        }
    }
    None
}

fn pie_chart(ui: &mut Ui, chart: &ChartSnapshot, counts: &[CategoryCount]) {
    let total: usize = counts.iter().map(|c| c.value).sum();
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), CHART_HEIGHT), Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    if total == 0 {
        painter.text(rect.center(), Align2::CENTER_CENTER, "No data", FontId::proportional(14.0), text_color);
        return;
    }

    let colors = category_colors(chart.spec.coloring, counts.iter().map(|c| &c.label));
    let radius = (rect.height().min(rect.width() * 0.55) / 2.0 - 8.0).max(10.0);
    let center = egui::pos2(rect.left() + radius + 8.0, rect.center().y);
    let fractions: Vec<f32> = counts.iter().map(|c| c.value as f32 / total as f32).collect();

    let mut start = -FRAC_PI_2;
    for (c, fraction) in counts.iter().zip(&fractions) {
        let sweep = fraction * TAU;
        let color = colors.color_for(&c.label);
        let mut done = 0.0;
        while done < sweep {
            let part = (sweep - done).min(FRAC_PI_2);
            painter.add(Shape::convex_polygon(wedge(center, radius, start + done, part), color, Stroke::NONE));
            done += part;
        }
        painter.line_segment(
            [center, center + radius * egui::vec2(start.cos(), start.sin())],
            Stroke::new(1.5, Color32::WHITE),
        );
        if sweep > 0.3 {
            let mid = start + sweep / 2.0;
            painter.text(
                center + radius * 0.65 * egui::vec2(mid.cos(), mid.sin()),
                Align2::CENTER_CENTER,
                format!("{:.1}%", fraction * 100.0),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
        start += sweep;
    }

    // Legend to the right of the pie.
    let mut legend_pos = egui::pos2(center.x + radius + 20.0, rect.top() + 12.0);
    for c in counts {
        if legend_pos.y > rect.bottom() - 8.0 {
            break;
        }
        let swatch = egui::Rect::from_min_size(legend_pos - egui::vec2(0.0, 5.0), egui::vec2(10.0, 10.0));
        painter.rect_filled(swatch, 2.0, colors.color_for(&c.label));
        painter.text(
            legend_pos + egui::vec2(16.0, 0.0),
            Align2::LEFT_CENTER,
            c.label.to_string(),
            FontId::proportional(12.0),
            text_color,
        );
        legend_pos.y += 18.0;
    }

    if let Some(pos) = response.hover_pos() {
        let d = pos - center;
        if d.length() <= radius {
            let rel = (d.y.atan2(d.x) + FRAC_PI_2).rem_euclid(TAU);
            if let Some(i) = slice_at(&fractions, rel) {
                let c = &counts[i];
                response.on_hover_text(format!(
                    "{}: {} ({:.1}%)",
                    c.label,
                    c.value,
                    fractions[i] * 100.0
                ));
            }
        }
    }
}
