//! Category Filter
//!
//! Narrows the dataset to records whose type, shape and color are all in the
//! user's selection. A record passes only if every one of its three category
//! values is selected, so an empty set for any category excludes everything.
//!
//! ## Metrics tracked
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `rows_in` | Gauge | Records evaluated |
//! | `rows_out` | Gauge | Records that passed |
//! | `selectivity` | Gauge | rows_out / rows_in as percentage |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::core::record::InventoryRecord;

/// Allowed values per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub types: BTreeSet<String>,
    pub shapes: BTreeSet<String>,
    pub colors: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new<T, S, C>(types: T, shapes: S, colors: C) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            shapes: shapes.into_iter().map(Into::into).collect(),
            colors: colors.into_iter().map(Into::into).collect(),
        }
    }

    /// Select nothing; every filter result is empty
    pub fn none() -> Self {
        Self::default()
    }

    /// Select every value present in `records`
    ///
    /// This is the initial selection of a session, so the first view shows
    /// the whole dataset.
    pub fn all(records: &[InventoryRecord]) -> Self {
        let options = CategoryOptions::from_records(records);
        Self::new(options.types, options.shapes, options.colors)
    }

    /// Whether all three category values of `record` are selected
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        self.types.contains(&record.block_type)
            && self.shapes.contains(&record.block_shape)
            && self.colors.contains(&record.block_color)
    }

    /// True when some category selects nothing
    pub fn excludes_everything(&self) -> bool {
        self.types.is_empty() || self.shapes.is_empty() || self.colors.is_empty()
    }
}

/// Keep the records matching `selection`, in input order
pub fn filter(records: &[InventoryRecord], selection: &FilterSelection) -> Vec<InventoryRecord> {
    if selection.excludes_everything() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| selection.matches(record))
        .cloned()
        .collect()
}

/// How much a filter narrowed its input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Percentage of input rows that passed; 0 for empty input
    pub selectivity: f64,
}

impl FilterStats {
    pub fn new(rows_in: usize, rows_out: usize) -> Self {
        let selectivity = if rows_in > 0 {
            (rows_out as f64 / rows_in as f64) * 100.0
        } else {
            0.0
        };
        Self {
            rows_in,
            rows_out,
            selectivity,
        }
    }
}

/// Distinct values per category, in the order they first appear
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOptions {
    pub types: Vec<String>,
    pub shapes: Vec<String>,
    pub colors: Vec<String>,
}

impl CategoryOptions {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        Self {
            types: distinct(records.iter().map(|r| r.block_type.as_str())),
            shapes: distinct(records.iter().map(|r| r.block_shape.as_str())),
            colors: distinct(records.iter().map(|r| r.block_color.as_str())),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_records() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new("Brick", "Rectangular", "2x4", "Red", 10, 2),
            InventoryRecord::new("Brick", "Rectangular", "2x4", "Blue", 5, 1),
            InventoryRecord::new("Plate", "Square", "2x2", "Red", 8, 0),
            InventoryRecord::new("Tile", "Round", "1x1", "Yellow", 20, 4),
            InventoryRecord::new("Brick", "Square", "2x2", "Red", 3, 3),
        ]
    }

    #[test]
    fn test_single_match() {
        let records = make_records();
        let selection = FilterSelection::new(["Brick"], ["Rectangular"], ["Red"]);
        let out = filter(&records[..2], &selection);
        assert_eq!(out, vec![records[0].clone()]);
    }

    #[test]
    fn test_preserves_input_order() {
        let records = make_records();
        let selection = FilterSelection::new(["Brick", "Plate"], ["Rectangular", "Square"], ["Red"]);
        let out = filter(&records, &selection);
        assert_eq!(out, vec![records[0].clone(), records[2].clone(), records[4].clone()]);
    }

    #[test]
    fn test_empty_category_excludes_everything() {
        let records = make_records();
        let all = FilterSelection::all(&records);

        let mut no_types = all.clone();
        no_types.types.clear();
        assert!(filter(&records, &no_types).is_empty());

        let mut no_shapes = all.clone();
        no_shapes.shapes.clear();
        assert!(filter(&records, &no_shapes).is_empty());

        let mut no_colors = all;
        no_colors.colors.clear();
        assert!(filter(&records, &no_colors).is_empty());
    }

    #[test]
    fn test_unknown_values_match_nothing() {
        let records = make_records();
        let selection = FilterSelection::new(["Minifigure"], ["Rectangular"], ["Red"]);
        assert!(filter(&records, &selection).is_empty());
    }

    #[test]
    fn test_all_selection_keeps_everything() {
        let records = make_records();
        assert_eq!(filter(&records, &FilterSelection::all(&records)), records);
    }

    #[test]
    fn test_duplicates_survive() {
        let record = InventoryRecord::new("Brick", "Rectangular", "2x4", "Red", 1, 1);
        let records = vec![record.clone(), record.clone()];
        let out = filter(&records, &FilterSelection::all(&records));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_options_first_seen_order() {
        let options = CategoryOptions::from_records(&make_records());
        assert_eq!(options.types, vec!["Brick", "Plate", "Tile"]);
        assert_eq!(options.shapes, vec!["Rectangular", "Square", "Round"]);
        assert_eq!(options.colors, vec!["Red", "Blue", "Yellow"]);
    }

    #[test]
    fn test_stats_selectivity() {
        let stats = FilterStats::new(4, 1);
        assert!((stats.selectivity - 25.0).abs() < f64::EPSILON);
        assert_eq!(FilterStats::new(0, 0).selectivity, 0.0);
    }
}
