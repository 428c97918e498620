use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::model::{FieldValue, FilteredView};

/// Why a single chart could not be computed in full.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ViewIssue {
    #[error("column '{0}' is not present in the dataset")]
    MissingColumn(String),
    #[error("column '{0}' has no usable values for the current filters")]
    NoValues(String),
}

// ---------------------------------------------------------------------------
// Aggregated shapes
// ---------------------------------------------------------------------------

/// One bar or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: FieldValue,
    pub value: usize,
}

/// One marker of the scatter view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub group: FieldValue,
    pub hover: String,
}

/// Half-open `[start, end)` bin; the last bin of a histogram is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

fn column<'a>(
    view: &FilteredView<'a>,
    name: &str,
) -> Result<impl Iterator<Item = &'a FieldValue> + 'a, ViewIssue> {
    view.column_values(name)
        .ok_or_else(|| ViewIssue::MissingColumn(name.to_string()))
}

fn pairs<'a>(
    view: &FilteredView<'a>,
    key: &str,
    value: &str,
) -> Result<impl Iterator<Item = (&'a FieldValue, &'a FieldValue)> + 'a, ViewIssue> {
    Ok(column(view, key)?.zip(column(view, value)?))
}

// ---------------------------------------------------------------------------
// Scalar summaries
// ---------------------------------------------------------------------------

/// Distinct non-missing values of a column; zero when the column is absent.
pub fn distinct_count(view: &FilteredView<'_>, name: &str) -> usize {
    view.column_values(name)
        .map(|values| values.filter(|v| !v.is_null()).collect::<HashSet<_>>().len())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Group-by reductions
// ---------------------------------------------------------------------------

/// Non-missing `value` count per non-missing `key`, in key order.
/// Keys whose values are all missing are kept with a zero count.
pub fn count_by(view: &FilteredView<'_>, key: &str, value: &str) -> Result<Vec<CategoryCount>, ViewIssue> {
    let mut groups: BTreeMap<&FieldValue, usize> = BTreeMap::new();
    for (k, v) in pairs(view, key, value)? {
        if k.is_null() {
            continue;
        }
        let count = groups.entry(k).or_default();
        if !v.is_null() {
            *count += 1;
        }
    }
    Ok(into_counts(groups))
}

/// Distinct non-missing `value` count per non-missing `key`, in key order.
pub fn distinct_by(view: &FilteredView<'_>, key: &str, value: &str) -> Result<Vec<CategoryCount>, ViewIssue> {
    let mut groups: BTreeMap<&FieldValue, HashSet<&FieldValue>> = BTreeMap::new();
    for (k, v) in pairs(view, key, value)? {
        if k.is_null() {
            continue;
        }
        let distinct = groups.entry(k).or_default();
        if !v.is_null() {
            distinct.insert(v);
        }
    }
    Ok(groups
        .into_iter()
        .map(|(label, distinct)| CategoryCount {
            label: label.clone(),
            value: distinct.len(),
        })
        .collect())
}

/// Like [`count_by`] but keyed by the hour of a time column. Unparsable
/// times are dropped.
pub fn count_by_hour(view: &FilteredView<'_>, time: &str, value: &str) -> Result<Vec<CategoryCount>, ViewIssue> {
    let mut groups: BTreeMap<u32, usize> = BTreeMap::new();
    for (t, v) in pairs(view, time, value)? {
        let Some(hour) = parse_hour(t) else {
            continue;
        };
        let count = groups.entry(hour).or_default();
        if !v.is_null() {
            *count += 1;
        }
    }
    Ok(groups
        .into_iter()
        .map(|(hour, value)| CategoryCount {
            label: FieldValue::Integer(hour as i64),
            value,
        })
        .collect())
}

/// Occurrences of each non-missing value, most frequent first. Ties keep
/// first-appearance order.
pub fn value_counts(view: &FilteredView<'_>, name: &str) -> Result<Vec<CategoryCount>, ViewIssue> {
    let mut slots: HashMap<&FieldValue, usize> = HashMap::new();
    let mut result: Vec<CategoryCount> = Vec::new();
    for v in column(view, name)? {
        if v.is_null() {
            continue;
        }
        let slot = *slots.entry(v).or_insert_with(|| {
            result.push(CategoryCount {
                label: v.clone(),
                value: 0,
            });
            result.len() - 1
        });
        result[slot].value += 1;
    }
    result.sort_by(|a, b| b.value.cmp(&a.value));
    Ok(result)
}

/// Keep the `n` largest entries. Stable, so equal values keep their order.
pub fn top_n(mut counts: Vec<CategoryCount>, n: usize) -> Vec<CategoryCount> {
    counts.sort_by(|a, b| b.value.cmp(&a.value));
    counts.truncate(n);
    counts
}

fn into_counts(groups: BTreeMap<&FieldValue, usize>) -> Vec<CategoryCount> {
    groups
        .into_iter()
        .map(|(label, value)| CategoryCount {
            label: label.clone(),
            value,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time parsing
// ---------------------------------------------------------------------------

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Hour of day of a clock time or date-time string.
pub fn parse_hour(value: &FieldValue) -> Option<u32> {
    let FieldValue::Text(s) = value else {
        return None;
    };
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.time())
        })
        .map(|t| t.hour())
}

// ---------------------------------------------------------------------------
// Numeric views
// ---------------------------------------------------------------------------

/// Rows where `x`, `y` and `size` are all numeric.
pub fn scatter_points(
    view: &FilteredView<'_>,
    x: &str,
    y: &str,
    size: &str,
    group: &str,
    hover: &str,
) -> Result<Vec<ScatterPoint>, ViewIssue> {
    let xs = column(view, x)?;
    let ys = column(view, y)?;
    let sizes = column(view, size)?;
    let groups = column(view, group)?;
    let hovers = column(view, hover)?;

    Ok(xs
        .zip(ys)
        .zip(sizes)
        .zip(groups)
        .zip(hovers)
        .filter_map(|((((x, y), size), group), hover)| {
            Some(ScatterPoint {
                x: x.as_f64()?,
                y: y.as_f64()?,
                size: size.as_f64()?,
                group: group.clone(),
                hover: hover.to_string(),
            })
        })
        .collect())
}

/// Equal-width histogram of the numeric values of a column.
pub fn histogram(view: &FilteredView<'_>, name: &str, bins: usize) -> Result<Vec<HistogramBin>, ViewIssue> {
    let values: Vec<f64> = column(view, name)?.filter_map(FieldValue::as_f64).collect();
    Ok(bin_values(&values, bins))
}

fn bin_values(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}
