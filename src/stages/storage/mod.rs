//! Storage stage
//!
//! Loads and flushes the dataset's backing CSV file.

pub mod csv_store;

pub use csv_store::DatasetStore;
