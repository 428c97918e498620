//! The fixed catalogue of dashboard views and the pipeline that turns a
//! filtered table into a [`DashboardSnapshot`].
//!
//! ```text
//!   FilteredView ──► Kpis
//!        │
//!        └──► for each ViewSpec: reduce ──► ChartData (+ optional ViewIssue)
//! ```
//!
//! Every chart is computed independently; an issue with one chart only
//! degrades that chart.

use serde::Serialize;

use crate::color::BOLD;
use crate::data::aggregate::{
    CategoryCount, HistogramBin, ScatterPoint, ViewIssue, count_by, count_by_hour, distinct_by,
    distinct_count, histogram, scatter_points, top_n, value_counts,
};
use crate::data::model::*;

// ---------------------------------------------------------------------------
// View catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    Pie,
    Scatter,
    Histogram,
}

/// How a view reduces the filtered rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduction {
    /// Non-missing `value` count per `key`.
    CountBy { key: &'static str, value: &'static str },
    /// Non-missing `value` count per hour of the `time` column.
    CountByHour { time: &'static str, value: &'static str },
    /// Distinct `value` count per `key`, optionally the `top` largest only.
    DistinctBy {
        key: &'static str,
        value: &'static str,
        top: Option<usize>,
    },
    /// Frequency of each value of `column`, optionally the `top` largest only.
    ValueCounts { column: &'static str, top: Option<usize> },
    Scatter {
        x: &'static str,
        y: &'static str,
        size: &'static str,
        group: &'static str,
        hover: &'static str,
    },
    Histogram { column: &'static str, bins: usize },
}

/// Bars take one palette colour each, or all share the first one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coloring {
    PerCategory(&'static [&'static str]),
    Uniform(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct ViewSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub reduction: Reduction,
    pub coloring: Coloring,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub views: &'static [ViewSpec],
}

const TOP: Option<usize> = Some(10);

pub static SECTIONS: &[Section] = &[
    Section {
        title: "📅 Temporal Analysis",
        views: &[
            ViewSpec {
                id: "season_sightings",
                title: "Bird Sightings by Season",
                kind: ChartKind::Bar,
                reduction: Reduction::CountBy { key: SEASON, value: SCIENTIFIC_NAME },
                coloring: Coloring::PerCategory(BOLD),
                x_label: SEASON,
                y_label: SCIENTIFIC_NAME,
            },
            ViewSpec {
                id: "hourly_activity",
                title: "Bird Activity by Hour",
                kind: ChartKind::Bar,
                reduction: Reduction::CountByHour { time: START_TIME, value: SCIENTIFIC_NAME },
                coloring: Coloring::Uniform(&["#ff6b6b"]),
                x_label: "Start_Hour",
                y_label: "Observations",
            },
        ],
    },
    Section {
        title: "📍 Spatial Analysis",
        views: &[
            ViewSpec {
                id: "location_diversity",
                title: "Species Diversity by Location Type",
                kind: ChartKind::Bar,
                reduction: Reduction::DistinctBy { key: LOCATION_TYPE, value: SCIENTIFIC_NAME, top: None },
                coloring: Coloring::PerCategory(BOLD),
                x_label: LOCATION_TYPE,
                y_label: SCIENTIFIC_NAME,
            },
            ViewSpec {
                id: "plot_diversity",
                title: "Top 10 Plots by Species Diversity",
                kind: ChartKind::Bar,
                reduction: Reduction::DistinctBy { key: PLOT_NAME, value: SCIENTIFIC_NAME, top: TOP },
                coloring: Coloring::Uniform(&["#48cae4"]),
                x_label: PLOT_NAME,
                y_label: SCIENTIFIC_NAME,
            },
        ],
    },
    Section {
        title: "🦉 Species Analysis",
        views: &[
            ViewSpec {
                id: "top_species",
                title: "Top 10 Observed Species",
                kind: ChartKind::Bar,
                reduction: Reduction::ValueCounts { column: SCIENTIFIC_NAME, top: TOP },
                coloring: Coloring::Uniform(&["#9b5de5"]),
                x_label: "Species",
                y_label: "Count",
            },
            ViewSpec {
                id: "id_methods",
                title: "ID Methods Used",
                kind: ChartKind::Pie,
                reduction: Reduction::ValueCounts { column: ID_METHOD, top: None },
                coloring: Coloring::PerCategory(BOLD),
                x_label: ID_METHOD,
                y_label: "Count",
            },
            ViewSpec {
                id: "sex_ratio",
                title: "Sex Ratio of Birds Observed",
                kind: ChartKind::Pie,
                reduction: Reduction::ValueCounts { column: SEX, top: None },
                coloring: Coloring::PerCategory(&["#ffb703", "#219ebc"]),
                x_label: SEX,
                y_label: "Count",
            },
        ],
    },
    Section {
        title: "🌦 Environmental Conditions",
        views: &[
            ViewSpec {
                id: "temperature_humidity",
                title: "Temperature vs Humidity by Season",
                kind: ChartKind::Scatter,
                reduction: Reduction::Scatter {
                    x: TEMPERATURE,
                    y: HUMIDITY,
                    size: INTERVAL_LENGTH,
                    group: SEASON,
                    hover: SCIENTIFIC_NAME,
                },
                coloring: Coloring::PerCategory(BOLD),
                x_label: TEMPERATURE,
                y_label: HUMIDITY,
            },
            ViewSpec {
                id: "disturbance",
                title: "Impact of Disturbance on Observations",
                kind: ChartKind::Bar,
                reduction: Reduction::ValueCounts { column: DISTURBANCE, top: None },
                coloring: Coloring::PerCategory(BOLD),
                x_label: DISTURBANCE,
                y_label: "Count",
            },
        ],
    },
    Section {
        title: "📏 Distance & Behavior",
        views: &[
            ViewSpec {
                id: "distance_distribution",
                title: "Distribution of Observation Distances",
                kind: ChartKind::Histogram,
                reduction: Reduction::Histogram { column: DISTANCE, bins: 20 },
                coloring: Coloring::Uniform(&["#06d6a0"]),
                x_label: DISTANCE,
                y_label: "count",
            },
            ViewSpec {
                id: "flyovers",
                title: "Flyover Observations",
                kind: ChartKind::Pie,
                reduction: Reduction::ValueCounts { column: FLYOVER_OBSERVED, top: None },
                coloring: Coloring::PerCategory(BOLD),
                x_label: FLYOVER_OBSERVED,
                y_label: "Count",
            },
        ],
    },
    Section {
        title: "👩‍🔬 Observer Trends",
        views: &[ViewSpec {
            id: "top_observers",
            title: "Top 10 Observers by Number of Observations",
            kind: ChartKind::Bar,
            reduction: Reduction::ValueCounts { column: OBSERVER, top: TOP },
            coloring: Coloring::Uniform(&["#ef476f"]),
            x_label: OBSERVER,
            y_label: "Count",
        }],
    },
    Section {
        title: "🛡 Conservation Insights",
        views: &[
            ViewSpec {
                id: "watchlist_status",
                title: "Watchlist Status Distribution",
                kind: ChartKind::Bar,
                reduction: Reduction::ValueCounts { column: PIF_WATCHLIST_STATUS, top: None },
                coloring: Coloring::Uniform(BOLD),
                x_label: "Watchlist Status",
                y_label: "Count",
            },
            ViewSpec {
                id: "top_aou_codes",
                title: "Top 10 AOU Codes",
                kind: ChartKind::Bar,
                reduction: Reduction::ValueCounts { column: AOU_CODE, top: TOP },
                coloring: Coloring::Uniform(&["#118ab2"]),
                x_label: AOU_CODE,
                y_label: "Count",
            },
        ],
    },
];

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_observations: usize,
    pub unique_species: usize,
    pub observers: usize,
}

impl Kpis {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        Kpis {
            total_observations: view.len(),
            unique_species: distinct_count(view, SCIENTIFIC_NAME),
            observers: distinct_count(view, OBSERVER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ChartData {
    Categories(Vec<CategoryCount>),
    Points(Vec<ScatterPoint>),
    Bins(Vec<HistogramBin>),
}

impl ChartData {
    fn empty_for(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Bar | ChartKind::Pie => ChartData::Categories(Vec::new()),
            ChartKind::Scatter => ChartData::Points(Vec::new()),
            ChartKind::Histogram => ChartData::Bins(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Categories(v) => v.is_empty(),
            ChartData::Points(v) => v.is_empty(),
            ChartData::Bins(v) => v.iter().all(|b| b.count == 0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    #[serde(skip)]
    pub spec: &'static ViewSpec,
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub data: ChartData,
    pub issue: Option<ViewIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSnapshot {
    pub title: &'static str,
    pub charts: Vec<ChartSnapshot>,
}

/// Everything the page shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub kpis: Kpis,
    pub sections: Vec<SectionSnapshot>,
}

impl DashboardSnapshot {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let sections = SECTIONS
            .iter()
            .map(|section| SectionSnapshot {
                title: section.title,
                charts: section.views.iter().map(|spec| compute_chart(spec, view)).collect(),
            })
            .collect();
        DashboardSnapshot {
            kpis: Kpis::compute(view),
            sections,
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSnapshot> {
        self.sections.iter().flat_map(|s| s.charts.iter())
    }
}

fn reduce(reduction: Reduction, view: &FilteredView<'_>) -> Result<ChartData, ViewIssue> {
    let data = match reduction {
        Reduction::CountBy { key, value } => ChartData::Categories(count_by(view, key, value)?),
        Reduction::CountByHour { time, value } => ChartData::Categories(count_by_hour(view, time, value)?),
        Reduction::DistinctBy { key, value, top } => {
            let counts = distinct_by(view, key, value)?;
            ChartData::Categories(match top {
                Some(n) => top_n(counts, n),
                None => counts,
            })
        }
        Reduction::ValueCounts { column, top } => {
            let counts = value_counts(view, column)?;
            ChartData::Categories(match top {
                Some(n) => top_n(counts, n),
                None => counts,
            })
        }
        Reduction::Scatter { x, y, size, group, hover } => {
            ChartData::Points(scatter_points(view, x, y, size, group, hover)?)
        }
        Reduction::Histogram { column, bins } => ChartData::Bins(histogram(view, column, bins)?),
    };
    Ok(data)
}

/// The column whose emptiness explains an empty chart.
fn primary_column(reduction: Reduction) -> &'static str {
    match reduction {
        Reduction::CountBy { key, .. } | Reduction::DistinctBy { key, .. } => key,
        Reduction::CountByHour { time, .. } => time,
        Reduction::ValueCounts { column, .. } | Reduction::Histogram { column, .. } => column,
        Reduction::Scatter { size, .. } => size,
    }
}

/// Compute one chart. Never fails: anomalies become an empty chart with an issue.
pub fn compute_chart(spec: &'static ViewSpec, view: &FilteredView<'_>) -> ChartSnapshot {
    let (data, issue) = match reduce(spec.reduction, view) {
        Ok(data) if data.is_empty() && !view.is_empty() => {
            (data, Some(ViewIssue::NoValues(primary_column(spec.reduction).to_string())))
        }
        Ok(data) => (data, None),
        Err(issue) => (ChartData::empty_for(spec.kind), Some(issue)),
    };
    if let Some(issue) = &issue {
        log::warn!("{}: {issue}", spec.title);
    }
    ChartSnapshot {
        spec,
        id: spec.id,
        title: spec.title,
        kind: spec.kind,
        data,
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterDimension, FilterOptions, FilterSelection, filtered_indices};
    use crate::data::model::tests::{sample_table, text};

    fn category_total(data: &ChartData) -> Option<usize> {
        match data {
            ChartData::Categories(counts) => Some(counts.iter().map(|c| c.value).sum()),
            _ => None,
        }
    }

    fn snapshot_for(table: &ObservationTable, selection: &FilterSelection) -> (usize, DashboardSnapshot) {
        let idx = filtered_indices(table, selection);
        let view = FilteredView::new(table, &idx);
        (idx.len(), DashboardSnapshot::compute(&view))
    }

    #[test]
    fn catalogue_has_fourteen_views() {
        let total: usize = SECTIONS.iter().map(|s| s.views.len()).sum();
        assert_eq!(total, 14);
        let mut ids: Vec<_> = SECTIONS.iter().flat_map(|s| s.views.iter().map(|v| v.id)).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 14);
    }

    #[test]
    fn kpis_match_distinct_counts() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let (_, snap) = snapshot_for(&table, &FilterSelection::all(&options));
        assert_eq!(
            snap.kpis,
            Kpis { total_observations: 5, unique_species: 3, observers: 3 }
        );
    }

    #[test]
    fn year_scenario_reflects_only_selected_rows() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let mut selection = FilterSelection::all(&options);
        selection.toggle(FilterDimension::Year, &FieldValue::Integer(2020));
        let (rows, snap) = snapshot_for(&table, &selection);
        assert_eq!(rows, 3);
        assert_eq!(
            snap.kpis,
            Kpis { total_observations: 3, unique_species: 2, observers: 3 }
        );
    }

    #[test]
    fn count_views_sum_to_filtered_rows() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let (rows, snap) = snapshot_for(&table, &FilterSelection::all(&options));
        let by_id = |id: &str| snap.charts().find(|c| c.id == id).unwrap();
        assert_eq!(category_total(&by_id("season_sightings").data), Some(rows));
        assert_eq!(category_total(&by_id("top_observers").data), Some(rows));
        assert_eq!(category_total(&by_id("top_species").data), Some(rows));
    }

    #[test]
    fn missing_columns_degrade_single_charts() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let (_, snap) = snapshot_for(&table, &FilterSelection::all(&options));
        let plots = snap.charts().find(|c| c.id == "plot_diversity").unwrap();
        assert_eq!(plots.issue, Some(ViewIssue::MissingColumn(PLOT_NAME.to_string())));
        assert!(plots.data.is_empty());
        let seasons = snap.charts().find(|c| c.id == "season_sightings").unwrap();
        assert!(seasons.issue.is_none());
        assert_eq!(snap.charts().count(), 14);
    }

    #[test]
    fn all_missing_column_notes_no_values() {
        let mut columns = sample_table().columns;
        columns.push(DISTANCE.to_string());
        let rows = sample_table()
            .rows
            .iter()
            .map(|r| {
                let mut values: Vec<FieldValue> = (0..5).map(|c| r.get(c).clone()).collect();
                values.push(text("<= 50 Meters").to_numeric());
                Observation::new(values)
            })
            .collect();
        let table = ObservationTable::new(columns, rows);
        let idx: Vec<usize> = (0..table.len()).collect();
        let view = FilteredView::new(&table, &idx);
        let spec = SECTIONS
            .iter()
            .flat_map(|s| s.views.iter())
            .find(|v| v.id == "distance_distribution")
            .unwrap();
        let chart = compute_chart(spec, &view);
        assert_eq!(chart.issue, Some(ViewIssue::NoValues(DISTANCE.to_string())));
        assert_eq!(chart.data, ChartData::Bins(Vec::new()));
    }

    #[test]
    fn empty_selection_renders_without_issues() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let mut selection = FilterSelection::all(&options);
        selection.select_none(FilterDimension::Season);
        let (rows, snap) = snapshot_for(&table, &selection);
        assert_eq!(rows, 0);
        assert_eq!(snap.kpis.total_observations, 0);
        let seasons = snap.charts().find(|c| c.id == "season_sightings").unwrap();
        assert!(seasons.data.is_empty());
        assert!(seasons.issue.is_none());
    }

    #[test]
    fn odd_missing_and_non_finite_cells_degrade_gracefully() {
        use std::io::Write;

        let csv = "Year,Season,Location_Type,Scientific_Name,Observer,ID_Method,Sex,Distance\n\
                   2020,Spring,Forest,Turdus migratorius,Ann,-nan,Male,-0.0\n\
                   2020,Spring,Forest,n/a,Bob,Singing,n/a,0.0\n\
                   2021,Summer,Grassland,Sitta carolinensis,<NA>,NaN,Female,12\n\
                   2021.0,Summer,Grassland,Turdus migratorius,Ann,Singing,Male,-nan\n";
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv.as_bytes()).unwrap();
        let table = crate::data::loader::load_file(file.path()).unwrap();

        let options = FilterOptions::from_table(&table);
        assert_eq!(
            options.values(FilterDimension::Year),
            &[FieldValue::Integer(2020), FieldValue::Integer(2021)]
        );
        let (rows, snap) = snapshot_for(&table, &FilterSelection::all(&options));
        assert_eq!(rows, 4);
        assert_eq!(snap.charts().count(), 14);
        assert_eq!(
            snap.kpis,
            Kpis { total_observations: 4, unique_species: 2, observers: 2 }
        );

        let by_id = |id: &str| snap.charts().find(|c| c.id == id).unwrap();
        let methods = by_id("id_methods");
        assert_eq!(
            methods.data,
            ChartData::Categories(vec![CategoryCount { label: text("Singing"), value: 2 }])
        );
        assert_eq!(category_total(&by_id("sex_ratio").data), Some(3));
        match &by_id("distance_distribution").data {
            ChartData::Bins(bins) => assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3),
            other => panic!("unexpected distance data {other:?}"),
        }
    }

    #[test]
    fn snapshot_serializes() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let (_, snap) = snapshot_for(&table, &FilterSelection::all(&options));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["kpis"]["total_observations"], 5);
        assert_eq!(json["sections"][0]["charts"][0]["data"]["type"], "categories");
    }
}
