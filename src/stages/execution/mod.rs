//! Execution stage
//!
//! Pure operators over record slices: the category filter and the grouped
//! aggregation that feeds the charts.

pub mod aggregate;
pub mod filter;

pub use aggregate::{aggregate, GroupRow, GroupedAggregate, KeyMetrics, QuantityTotals};
pub use filter::{filter, CategoryOptions, FilterSelection, FilterStats};
