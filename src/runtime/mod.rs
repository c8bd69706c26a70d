//! Session runtime
//!
//! Drives the pipeline for an interactive session: load once, recompute the
//! view on every selection change, append and publish new records.

pub mod session;
pub mod timer;

pub use session::{DashboardView, InventorySession};
