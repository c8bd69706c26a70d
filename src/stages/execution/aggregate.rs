//! Grouped aggregation and key metrics
//!
//! Sums quantities per (type, color) for the charts and computes the headline
//! numbers shown above them. Both are computed over the filtered records.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

use crate::core::record::{GroupKey, InventoryRecord};

/// Summed quantities of one bucket
///
/// Sums are `u128` so adding any number of `u64` quantities stays exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityTotals {
    pub available_quantity: u128,
    pub sold_out: u128,
}

impl QuantityTotals {
    fn add(&mut self, record: &InventoryRecord) {
        self.available_quantity += u128::from(record.available_quantity);
        self.sold_out += u128::from(record.sold_out);
    }
}

/// One output row of the grouped aggregate, as handed to charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    #[serde(rename = "Block Type")]
    pub block_type: String,
    #[serde(rename = "Block Color")]
    pub block_color: String,
    #[serde(rename = "Available Quantity")]
    pub available_quantity: u128,
    #[serde(rename = "Sold Out")]
    pub sold_out: u128,
}

/// Quantities summed per (type, color)
///
/// Keys iterate sorted by type, then color. Serializes as a list of
/// [`GroupRow`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedAggregate {
    groups: BTreeMap<GroupKey, QuantityTotals>,
}

impl GroupedAggregate {
    pub fn get(&self, block_type: &str, block_color: &str) -> Option<QuantityTotals> {
        self.groups
            .get(&GroupKey::new(block_type, block_color))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &QuantityTotals)> {
        self.groups.iter()
    }

    pub fn rows(&self) -> Vec<GroupRow> {
        self.groups
            .iter()
            .map(|(key, totals)| GroupRow {
                block_type: key.block_type.clone(),
                block_color: key.block_color.clone(),
                available_quantity: totals.available_quantity,
                sold_out: totals.sold_out,
            })
            .collect()
    }

    /// Sum over every bucket
    pub fn totals(&self) -> QuantityTotals {
        self.groups.values().fold(QuantityTotals::default(), |acc, t| QuantityTotals {
            available_quantity: acc.available_quantity + t.available_quantity,
            sold_out: acc.sold_out + t.sold_out,
        })
    }
}

impl Serialize for GroupedAggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// Sum both quantities per (type, color)
pub fn aggregate(records: &[InventoryRecord]) -> GroupedAggregate {
    let mut groups: BTreeMap<GroupKey, QuantityTotals> = BTreeMap::new();
    for record in records {
        groups.entry(record.group_key()).or_default().add(record);
    }
    GroupedAggregate { groups }
}

/// Headline numbers for the filtered set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_available: u128,
    pub total_sold_out: u128,
    /// Distinct block types among the filtered records
    pub block_types: usize,
    /// Distinct block colors among the filtered records
    pub block_colors: usize,
}

impl KeyMetrics {
    pub fn compute(records: &[InventoryRecord]) -> Self {
        let mut totals = QuantityTotals::default();
        let mut types = HashSet::new();
        let mut colors = HashSet::new();

        for record in records {
            totals.add(record);
            types.insert(record.block_type.as_str());
            colors.insert(record.block_color.as_str());
        }

        Self {
            total_available: totals.available_quantity,
            total_sold_out: totals.sold_out,
            block_types: types.len(),
            block_colors: colors.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_records() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new("Brick", "Rectangular", "2x4", "Red", 10, 2),
            InventoryRecord::new("Brick", "Square", "2x2", "Red", 4, 1),
            InventoryRecord::new("Brick", "Rectangular", "2x4", "Blue", 5, 1),
            InventoryRecord::new("Plate", "Square", "2x2", "Red", 8, 0),
        ]
    }

    #[test]
    fn test_single_record() {
        let records = vec![InventoryRecord::new("Brick", "Rectangular", "2x4", "Red", 10, 2)];
        let grouped = aggregate(&records);
        assert_eq!(grouped.len(), 1);
        assert_eq!(
            grouped.get("Brick", "Red"),
            Some(QuantityTotals { available_quantity: 10, sold_out: 2 })
        );
    }

    #[test]
    fn test_sums_across_shapes() {
        let grouped = aggregate(&make_records());
        assert_eq!(grouped.len(), 3);
        assert_eq!(
            grouped.get("Brick", "Red"),
            Some(QuantityTotals { available_quantity: 14, sold_out: 3 })
        );
        assert_eq!(
            grouped.get("Plate", "Red"),
            Some(QuantityTotals { available_quantity: 8, sold_out: 0 })
        );
        assert_eq!(grouped.get("Plate", "Blue"), None);
    }

    #[test]
    fn test_empty_input() {
        let grouped = aggregate(&[]);
        assert!(grouped.is_empty());
        assert_eq!(grouped.totals(), QuantityTotals::default());
    }

    #[test]
    fn test_input_order_irrelevant() {
        let mut records = make_records();
        let forward = aggregate(&records);
        records.reverse();
        assert_eq!(aggregate(&records), forward);
    }

    #[test]
    fn test_rows_sorted_by_type_then_color() {
        let rows = aggregate(&make_records()).rows();
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.block_type.as_str(), r.block_color.as_str()))
            .collect();
        assert_eq!(keys, vec![("Brick", "Blue"), ("Brick", "Red"), ("Plate", "Red")]);
    }

    #[test]
    fn test_serializes_as_rows() {
        let json = serde_json::to_value(aggregate(&make_records())).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Block Type"], "Brick");
        assert_eq!(rows[0]["Block Color"], "Blue");
        assert_eq!(rows[0]["Available Quantity"], 5);
    }

    #[test]
    fn test_key_metrics() {
        let metrics = KeyMetrics::compute(&make_records());
        assert_eq!(
            metrics,
            KeyMetrics {
                total_available: 27,
                total_sold_out: 4,
                block_types: 2,
                block_colors: 2,
            }
        );
        assert_eq!(KeyMetrics::compute(&[]), KeyMetrics::default());
    }

    #[test]
    fn test_sums_past_u64_range_stay_exact() {
        let records = vec![
            InventoryRecord::new("Brick", "Rectangular", "2x4", "Red", u64::MAX, u64::MAX),
            InventoryRecord::new("Brick", "Square", "2x2", "Red", 1, 2),
        ];
        let expected = u128::from(u64::MAX) + 1;

        let grouped = aggregate(&records);
        assert_eq!(
            grouped.get("Brick", "Red"),
            Some(QuantityTotals { available_quantity: expected, sold_out: expected + 1 })
        );
        assert_eq!(grouped.totals().available_quantity, expected);

        let metrics = KeyMetrics::compute(&records);
        assert_eq!(metrics.total_available, expected);
        assert_eq!(metrics.total_sold_out, expected + 1);

        let json = serde_json::to_string(&grouped).unwrap();
        assert!(json.contains("\"Available Quantity\":18446744073709551616"));
    }

    #[test]
    fn test_totals_match_key_metrics() {
        let records = make_records();
        let totals = aggregate(&records).totals();
        let metrics = KeyMetrics::compute(&records);
        assert_eq!(totals.available_quantity, metrics.total_available);
        assert_eq!(totals.sold_out, metrics.total_sold_out);
    }
}
