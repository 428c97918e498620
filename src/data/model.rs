use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const YEAR: &str = "Year";
pub const SEASON: &str = "Season";
pub const LOCATION_TYPE: &str = "Location_Type";
pub const PLOT_NAME: &str = "Plot_Name";
pub const SCIENTIFIC_NAME: &str = "Scientific_Name";
pub const OBSERVER: &str = "Observer";
pub const START_TIME: &str = "Start_Time";
pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity";
pub const INTERVAL_LENGTH: &str = "Interval_Length";
pub const COUNT: &str = "Count";
pub const DISTANCE: &str = "Distance";
pub const ID_METHOD: &str = "ID_Method";
pub const SEX: &str = "Sex";
pub const DISTURBANCE: &str = "Disturbance";
pub const FLYOVER_OBSERVED: &str = "Flyover_Observed";
pub const PIF_WATCHLIST_STATUS: &str = "PIF_Watchlist_Status";
pub const AOU_CODE: &str = "AOU_Code";

/// Columns coerced to floats at load time.
pub const NUMERIC_COLUMNS: [&str; 5] = [INTERVAL_LENGTH, TEMPERATURE, HUMIDITY, COUNT, DISTANCE];

/// Columns the filters and KPIs read unconditionally.
pub const REQUIRED_COLUMNS: [&str; 5] = [YEAR, SEASON, LOCATION_TYPE, SCIENTIFIC_NAME, OBSERVER];

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the observation table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Filter selections live in `BTreeSet`s so `FieldValue` must be `Ord`.
///
/// Equality, ordering and hashing agree: numbers compare by value across
/// `Integer` and `Float` (so `2020` and `2020.0` are one key) and `-0.0`
/// equals `0.0`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// `v` as an exact `i64` when it is a whole number in range.
fn whole_number(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

fn canonical_float(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

fn cmp_int_float(a: i64, b: f64) -> Ordering {
    match whole_number(b) {
        Some(b) => a.cmp(&b),
        None => (a as f64).total_cmp(&b),
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use FieldValue::*;
        fn rank(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => match (whole_number(*a), whole_number(*b)) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => canonical_float(*a).total_cmp(&canonical_float(*b)),
            },
            (Integer(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            FieldValue::Text(s) => (3u8, s).hash(state),
            FieldValue::Integer(i) => (2u8, 0u8, i).hash(state),
            FieldValue::Float(f) => match whole_number(*f) {
                Some(i) => (2u8, 0u8, i).hash(state),
                None => (2u8, 1u8, canonical_float(*f).to_bits()).hash(state),
            },
            FieldValue::Bool(b) => (1u8, b).hash(state),
            FieldValue::Null => 0u8.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(true) => write!(f, "True"),
            FieldValue::Bool(false) => write!(f, "False"),
            FieldValue::Null => write!(f, "<missing>"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Interpret the value as an `f64` where that is meaningful.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) if v.is_finite() => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Coerce to a float, mapping anything unparsable to `Null`.
    pub fn to_numeric(&self) -> FieldValue {
        match self {
            FieldValue::Float(v) if v.is_nan() => FieldValue::Null,
            FieldValue::Float(v) => FieldValue::Float(*v),
            FieldValue::Integer(i) => FieldValue::Float(*i as f64),
            FieldValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if !v.is_nan() => FieldValue::Float(v),
                _ => FieldValue::Null,
            },
            FieldValue::Bool(_) | FieldValue::Null => FieldValue::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// ObservationTable – the complete loaded dataset
// ---------------------------------------------------------------------------

static MISSING: FieldValue = FieldValue::Null;

/// One sighting (one row of the source table). Holds one value per column.
#[derive(Debug, Clone)]
pub struct Observation {
    values: Vec<FieldValue>,
}

impl Observation {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Observation { values }
    }

    pub fn get(&self, column: usize) -> &FieldValue {
        self.values.get(column).unwrap_or(&MISSING)
    }
}

/// The full parsed dataset with a column lookup.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    /// Ordered column names as they appear in the source file.
    pub columns: Vec<String>,
    column_index: HashMap<String, usize>,
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    /// Build a table; every row must already be as wide as `columns`.
    pub fn new(columns: Vec<String>, rows: Vec<Observation>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        ObservationTable {
            columns,
            column_index,
            rows,
        }
    }

    /// Position of a named column, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Replace every value of the named columns with its numeric coercion.
    /// Columns that do not exist are skipped.
    pub fn coerce_numeric(&mut self, names: &[&str]) {
        let targets: Vec<usize> = names.iter().filter_map(|n| self.column(n)).collect();
        for row in &mut self.rows {
            for &col in &targets {
                if let Some(v) = row.values.get_mut(col) {
                    *v = v.to_numeric();
                }
            }
        }
    }

    /// Non-missing distinct values of a column in first-appearance order.
    pub fn distinct_values(&self, name: &str) -> Vec<FieldValue> {
        let Some(col) = self.column(name) else {
            return Vec::new();
        };
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .map(|r| r.get(col))
            .filter(|v| !v.is_null() && seen.insert(*v))
            .cloned()
            .collect()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// FilteredView – a subset of rows, by index
// ---------------------------------------------------------------------------

/// Borrowed view over the rows that passed the filters.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    pub table: &'a ObservationTable,
    pub indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(table: &'a ObservationTable, indices: &'a [usize]) -> Self {
        FilteredView { table, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Observation> + 'a {
        let (table, indices) = (self.table, self.indices);
        indices.iter().map(move |&i| &table.rows[i])
    }

    /// Values of one column over the visible rows, `None` when the column is absent.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &'a FieldValue> + 'a> {
        let col = self.table.column(name)?;
        Some(self.rows().map(move |r| r.get(col)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    /// Small table: Year, Season, Location_Type, Scientific_Name, Observer.
    pub(crate) fn sample_table() -> ObservationTable {
        let columns = [YEAR, SEASON, LOCATION_TYPE, SCIENTIFIC_NAME, OBSERVER]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let raw = [
            (2020, "Spring", "Forest", "Turdus migratorius", "Ann"),
            (2020, "Summer", "Grassland", "Cardinalis cardinalis", "Bob"),
            (2021, "Spring", "Forest", "Turdus migratorius", "Bob"),
            (2021, "Summer", "Forest", "Sitta carolinensis", "Cam"),
            (2021, "Autumn", "Grassland", "Turdus migratorius", "Ann"),
        ];
        let rows = raw
            .iter()
            .map(|&(y, s, l, n, o)| {
                Observation::new(vec![FieldValue::Integer(y), text(s), text(l), text(n), text(o)])
            })
            .collect();
        ObservationTable::new(columns, rows)
    }

    #[test]
    fn ordering_groups_by_type_then_value() {
        let mut vals = vec![text("b"), FieldValue::Integer(3), FieldValue::Null, text("a"), FieldValue::Integer(-1)];
        vals.sort();
        assert_eq!(
            vals,
            vec![FieldValue::Null, FieldValue::Integer(-1), FieldValue::Integer(3), text("a"), text("b")]
        );
    }

    #[test]
    fn equality_agrees_with_hashing_across_number_types() {
        use std::collections::{BTreeSet, HashSet};
        let values = [
            FieldValue::Integer(2020),
            FieldValue::Float(2020.0),
            FieldValue::Float(-0.0),
            FieldValue::Float(0.0),
            FieldValue::Float(f64::NAN),
            FieldValue::Float(f64::NAN),
            FieldValue::Float(2020.5),
        ];
        assert_eq!(FieldValue::Integer(2020), FieldValue::Float(2020.0));
        assert_eq!(FieldValue::Float(-0.0), FieldValue::Float(0.0));
        assert_eq!(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN));
        assert!(FieldValue::Integer(2020) < FieldValue::Float(2020.5));
        assert!(FieldValue::Float(2020.5) < FieldValue::Integer(2021));

        let hashed: HashSet<&FieldValue> = values.iter().collect();
        let ordered: BTreeSet<&FieldValue> = values.iter().collect();
        assert_eq!(hashed.len(), 4);
        assert_eq!(ordered.len(), 4);
    }

    #[test]
    fn mixed_integer_and_float_years_are_one_option() {
        let columns = vec![YEAR.to_string()];
        let rows = vec![
            Observation::new(vec![FieldValue::Integer(2020)]),
            Observation::new(vec![FieldValue::Float(2020.0)]),
            Observation::new(vec![FieldValue::Integer(2021)]),
        ];
        let table = ObservationTable::new(columns, rows);
        assert_eq!(
            table.distinct_values(YEAR),
            vec![FieldValue::Integer(2020), FieldValue::Integer(2021)]
        );
    }

    #[test]
    fn numeric_coercion_marks_unparsable_as_missing() {
        assert_eq!(text(" 12.5 ").to_numeric(), FieldValue::Float(12.5));
        assert_eq!(FieldValue::Integer(4).to_numeric(), FieldValue::Float(4.0));
        assert_eq!(text("<= 50 Meters").to_numeric(), FieldValue::Null);
        assert_eq!(FieldValue::Bool(true).to_numeric(), FieldValue::Null);
        assert_eq!(FieldValue::Float(f64::NAN).to_numeric(), FieldValue::Null);
    }

    #[test]
    fn distinct_values_keep_first_appearance() {
        let table = sample_table();
        assert_eq!(
            table.distinct_values(SEASON),
            vec![text("Spring"), text("Summer"), text("Autumn")]
        );
        assert!(table.distinct_values("Nope").is_empty());
    }

    #[test]
    fn view_column_values_absent_column_is_none() {
        let table = sample_table();
        let idx = [0, 2];
        let view = FilteredView::new(&table, &idx);
        assert!(view.column_values(PLOT_NAME).is_none());
        let years: Vec<_> = view.column_values(YEAR).unwrap().cloned().collect();
        assert_eq!(years, vec![FieldValue::Integer(2020), FieldValue::Integer(2021)]);
    }
}
