//! Pipeline metrics
//!
//! The session records row counts, timings and publish outcomes here so a
//! consumer can show how a filter narrowed the dataset and how syncing has
//! gone over the lifetime of the process.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Metric ids recorded by the pipeline
pub mod ids {
    pub const ROWS_IN: &str = "rows_in";
    pub const ROWS_OUT: &str = "rows_out";
    pub const SELECTIVITY: &str = "selectivity";
    pub const GROUPS: &str = "groups";
    pub const LOAD_MS: &str = "load_ms";
    pub const VIEW_MS: &str = "view_ms";
    pub const RECORDS_APPENDED: &str = "records_appended";
    pub const PUBLISH_MS: &str = "publish_ms";
    pub const PUBLISH_SUCCESS: &str = "publish_success";
    pub const PUBLISH_LOCAL_ONLY: &str = "publish_local_only";
    pub const PUBLISH_LOCAL_FAILURE: &str = "publish_local_failure";
    pub const PUBLISH_REMOTE_FAILURE: &str = "publish_remote_failure";
}

/// Type of aggregation to apply to collected metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationType {
    /// Sum of all values
    Sum,
    /// Average (mean) of all values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// 50th percentile (median)
    P50,
    /// 95th percentile
    P95,
}

/// Thread-safe metrics collector
///
/// Stores raw samples per metric id. Clones share the same storage, so the
/// session and any observer see the same numbers.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<HashMap<String, Vec<f64>>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric value
    ///
    /// # Examples
    /// ```
    /// use inventory_browser::core::metrics::MetricsCollector;
    ///
    /// let collector = MetricsCollector::new();
    /// collector.record("rows_out", 42.0);
    /// ```
    pub fn record(&self, metric_id: &str, value: f64) {
        self.metrics
            .lock()
            .entry(metric_id.to_string())
            .or_default()
            .push(value);
    }

    /// Increment a counter metric by 1
    pub fn increment(&self, metric_id: &str) {
        self.record(metric_id, 1.0);
    }

    /// All recorded values for a metric, empty if it was never recorded
    pub fn get_values(&self, metric_id: &str) -> Vec<f64> {
        self.metrics.lock().get(metric_id).cloned().unwrap_or_default()
    }

    /// The most recent value recorded for a metric
    pub fn last(&self, metric_id: &str) -> Option<f64> {
        self.metrics
            .lock()
            .get(metric_id)
            .and_then(|values| values.last().copied())
    }

    /// Aggregate metric values using the specified aggregation type
    ///
    /// # Examples
    /// ```
    /// use inventory_browser::core::metrics::{AggregationType, MetricsCollector};
    ///
    /// let collector = MetricsCollector::new();
    /// collector.record("load_ms", 10.0);
    /// collector.record("load_ms", 20.0);
    /// collector.record("load_ms", 30.0);
    ///
    /// assert_eq!(collector.aggregate("load_ms", AggregationType::Avg), Some(20.0));
    /// assert_eq!(collector.aggregate("load_ms", AggregationType::Max), Some(30.0));
    /// ```
    pub fn aggregate(&self, metric_id: &str, agg_type: AggregationType) -> Option<f64> {
        let values = self.get_values(metric_id);
        if values.is_empty() {
            return None;
        }

        match agg_type {
            AggregationType::Sum => Some(values.iter().sum()),
            AggregationType::Avg => Some(values.iter().sum::<f64>() / values.len() as f64),
            AggregationType::Min => values.iter().copied().reduce(f64::min),
            AggregationType::Max => values.iter().copied().reduce(f64::max),
            AggregationType::P50 => Self::percentile(&values, 0.5),
            AggregationType::P95 => Self::percentile(&values, 0.95),
        }
    }

    /// Percentile with linear interpolation between the two nearest samples
    fn percentile(values: &[f64], p: f64) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let idx = (sorted.len() as f64 - 1.0) * p;
        let idx_lower = idx.floor() as usize;
        let idx_upper = idx.ceil() as usize;

        if idx_lower == idx_upper {
            sorted.get(idx_lower).copied()
        } else {
            let lower = sorted[idx_lower];
            let upper = sorted[idx_upper];
            let fraction = idx - idx_lower as f64;
            Some(lower + (upper - lower) * fraction)
        }
    }

    /// Number of samples recorded for a metric
    pub fn get_count(&self, metric_id: &str) -> usize {
        self.metrics.lock().get(metric_id).map(|v| v.len()).unwrap_or(0)
    }

    pub fn get_metric_ids(&self) -> Vec<String> {
        self.metrics.lock().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.metrics.lock().clear();
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("metrics", &self.get_metric_ids())
            .finish()
    }
}
