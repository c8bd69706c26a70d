//! Inventory Browser - dataset pipeline for the Lego inventory dashboard
//!
//! This crate loads the inventory CSV, narrows it by category selections,
//! computes grouped sums and key metrics for display, and appends new records
//! to the dataset file before pushing it to a remote mirror.

pub mod config;
pub mod core;
pub mod logging;
pub mod runtime;
pub mod stages;
mod tests;

// Re-export commonly used types
pub use crate::config::{AppConfig, RemoteConfig};
pub use crate::core::{InventoryRecord, RecordInput, StoreError};
pub use crate::runtime::{DashboardView, InventorySession};
pub use crate::stages::distribution::{PublishOutcome, RemoteTransport, SyncPublisher};
pub use crate::stages::execution::{aggregate, filter, FilterSelection, GroupedAggregate};
pub use crate::stages::storage::DatasetStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
