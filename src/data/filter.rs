use std::collections::{BTreeMap, BTreeSet};

use super::model::{FieldValue, LOCATION_TYPE, ObservationTable, SEASON, YEAR};

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

/// The three sidebar filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterDimension {
    Year,
    Season,
    LocationType,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 3] = [
        FilterDimension::Year,
        FilterDimension::Season,
        FilterDimension::LocationType,
    ];

    pub fn column(self) -> &'static str {
        match self {
            FilterDimension::Year => YEAR,
            FilterDimension::Season => SEASON,
            FilterDimension::LocationType => LOCATION_TYPE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Year => "Select Year(s)",
            FilterDimension::Season => "Select Season(s)",
            FilterDimension::LocationType => "Select Location Type",
        }
    }
}

// ---------------------------------------------------------------------------
// Options: which values can be picked per dimension
// ---------------------------------------------------------------------------

/// Non-missing values offered for each dimension, in display order.
/// Years are sorted; the other dimensions keep first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    options: BTreeMap<FilterDimension, Vec<FieldValue>>,
}

impl FilterOptions {
    pub fn from_table(table: &ObservationTable) -> Self {
        let options = FilterDimension::ALL
            .iter()
            .map(|&dim| {
                let mut values = table.distinct_values(dim.column());
                if dim == FilterDimension::Year {
                    values.sort();
                }
                (dim, values)
            })
            .collect();
        FilterOptions { options }
    }

    pub fn values(&self, dim: FilterDimension) -> &[FieldValue] {
        self.options.get(&dim).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Selection: which values are currently picked
// ---------------------------------------------------------------------------

/// Per-dimension selection state. An empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    selected: BTreeMap<FilterDimension, BTreeSet<FieldValue>>,
}

impl FilterSelection {
    /// Select every offered value (the dashboard default).
    pub fn all(options: &FilterOptions) -> Self {
        let selected = FilterDimension::ALL
            .iter()
            .map(|&dim| (dim, options.values(dim).iter().cloned().collect()))
            .collect();
        FilterSelection { selected }
    }

    pub fn selected(&self, dim: FilterDimension) -> Option<&BTreeSet<FieldValue>> {
        self.selected.get(&dim)
    }

    pub fn is_selected(&self, dim: FilterDimension, value: &FieldValue) -> bool {
        self.selected
            .get(&dim)
            .is_some_and(|set| set.contains(value))
    }

    /// Toggle a single value in a dimension.
    pub fn toggle(&mut self, dim: FilterDimension, value: &FieldValue) {
        let set = self.selected.entry(dim).or_default();
        if !set.remove(value) {
            set.insert(value.clone());
        }
    }

    /// Select all offered values of a dimension.
    pub fn select_all(&mut self, dim: FilterDimension, options: &FilterOptions) {
        self.selected
            .insert(dim, options.values(dim).iter().cloned().collect());
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: FilterDimension) {
        self.selected.insert(dim, BTreeSet::new());
    }
}

/// Return indices of observations whose Year, Season and Location_Type are
/// each in the corresponding selected set.
///
/// * A dimension absent from the selection, or with an empty set, matches nothing.
/// * A missing value never matches.
pub fn filtered_indices(table: &ObservationTable, selection: &FilterSelection) -> Vec<usize> {
    let dims: Vec<(Option<usize>, Option<&BTreeSet<FieldValue>>)> = FilterDimension::ALL
        .iter()
        .map(|&dim| (table.column(dim.column()), selection.selected(dim)))
        .collect();

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            dims.iter().all(|(col, selected)| match (col, selected) {
                (Some(col), Some(selected)) => {
                    let value = row.get(*col);
                    !value.is_null() && selected.contains(value)
                }
                _ => false,
            })
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{sample_table, text};

    fn set(values: &[FieldValue]) -> BTreeSet<FieldValue> {
        values.iter().cloned().collect()
    }

    fn from_sets(
        years: BTreeSet<FieldValue>,
        seasons: BTreeSet<FieldValue>,
        locations: BTreeSet<FieldValue>,
    ) -> FilterSelection {
        FilterSelection {
            selected: BTreeMap::from([
                (FilterDimension::Year, years),
                (FilterDimension::Season, seasons),
                (FilterDimension::LocationType, locations),
            ]),
        }
    }

    #[test]
    fn all_options_return_full_table() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let selection = FilterSelection::all(&options);
        assert_eq!(filtered_indices(&table, &selection), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn any_empty_set_returns_nothing() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        for dim in FilterDimension::ALL {
            let mut selection = FilterSelection::all(&options);
            selection.select_none(dim);
            assert!(filtered_indices(&table, &selection).is_empty(), "{dim:?}");
        }
    }

    #[test]
    fn every_kept_row_matches_all_sets() {
        let table = sample_table();
        let selection = from_sets(
            set(&[FieldValue::Integer(2021)]),
            set(&[text("Spring"), text("Summer")]),
            set(&[text("Forest")]),
        );
        let kept = filtered_indices(&table, &selection);
        assert_eq!(kept, vec![2, 3]);
        assert!(kept.len() <= table.len());
        for &i in &kept {
            for dim in FilterDimension::ALL {
                let col = table.column(dim.column()).unwrap();
                assert!(selection.is_selected(dim, table.rows[i].get(col)));
            }
        }
    }

    #[test]
    fn year_scenario_keeps_only_selected_year() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        let mut selection = FilterSelection::all(&options);
        selection.toggle(FilterDimension::Year, &FieldValue::Integer(2020));
        assert!(!selection.is_selected(FilterDimension::Year, &FieldValue::Integer(2020)));
        assert_eq!(filtered_indices(&table, &selection), vec![2, 3, 4]);

        selection.toggle(FilterDimension::Year, &FieldValue::Integer(2020));
        selection.select_none(FilterDimension::Year);
        selection.select_all(FilterDimension::Year, &options);
        assert_eq!(filtered_indices(&table, &selection).len(), 5);
    }

    #[test]
    fn missing_values_never_match() {
        let mut table = sample_table();
        let season = table.column(SEASON).unwrap();
        let template = table.rows[0].clone();
        let mut values: Vec<FieldValue> =
            (0..table.columns.len()).map(|c| template.get(c).clone()).collect();
        values[season] = FieldValue::Null;
        table.rows.push(crate::data::model::Observation::new(values));

        let options = FilterOptions::from_table(&table);
        assert!(!options.values(FilterDimension::Season).contains(&FieldValue::Null));
        let selection = FilterSelection::all(&options);
        assert_eq!(filtered_indices(&table, &selection).len(), 5);
    }

    #[test]
    fn year_options_are_sorted() {
        let table = sample_table();
        let options = FilterOptions::from_table(&table);
        assert_eq!(
            options.values(FilterDimension::Year),
            &[FieldValue::Integer(2020), FieldValue::Integer(2021)]
        );
    }
}
