//! Core record types and shared infrastructure
//!
//! This module defines the inventory record, the error taxonomy, input
//! validation and the metrics collector used by every pipeline stage.

pub mod error;
pub mod metrics;
pub mod record;
pub mod validation;

pub use error::{ConfigError, RemoteError, RemoteFailureKind, RemoteStep, StoreError, ValidationError};
pub use metrics::MetricsCollector;
pub use record::{GroupKey, InventoryRecord, RecordInput, COLUMNS};
pub use validation::ValidationResult;
