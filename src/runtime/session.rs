//! Browsing session
//!
//! Ties the stages together for one user session: the dataset is loaded once,
//! every selection change produces a fresh [`DashboardView`], and adding a
//! record goes through validation, re-read-and-append, and publishing.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::core::error::StoreError;
use crate::core::metrics::{ids, MetricsCollector};
use crate::core::record::{InventoryRecord, RecordInput};
use crate::stages::distribution::{GitCommandTransport, PublishOutcome, SyncPublisher};
use crate::stages::execution::{
    aggregate, filter, CategoryOptions, FilterSelection, FilterStats, GroupedAggregate, KeyMetrics,
};
use crate::stages::storage::DatasetStore;
use crate::stages::PipelineStage;

use super::timer::Timer;

/// Everything the presentation layer renders for one selection
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// The whole dataset as loaded
    pub records: Vec<InventoryRecord>,
    pub filtered: Vec<InventoryRecord>,
    pub grouped: GroupedAggregate,
    pub metrics: KeyMetrics,
    pub stats: FilterStats,
}

pub struct InventorySession {
    store: DatasetStore,
    records: Vec<InventoryRecord>,
    publisher: Option<SyncPublisher>,
    metrics: MetricsCollector,
}

impl InventorySession {
    /// Load the dataset and start a session without remote sync
    pub fn open(store: DatasetStore) -> Result<Self, StoreError> {
        let metrics = MetricsCollector::new();
        let timer = Timer::now();
        let records = store.load()?;
        metrics.record(ids::LOAD_MS, timer.elapsed_ms());

        info!(
            stage = %PipelineStage::Storage,
            path = %store.path().display(),
            rows = records.len(),
            "Session opened"
        );

        Ok(Self {
            store,
            records,
            publisher: None,
            metrics,
        })
    }

    /// Open the configured dataset, syncing through git when a remote is set
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let session = Self::open(DatasetStore::new(config.dataset_path.clone()))?;
        Ok(match &config.remote {
            Some(remote) => {
                let transport = GitCommandTransport::from_config(remote);
                session.with_publisher(SyncPublisher::new(remote.clone(), Box::new(transport)))
            }
            None => session,
        })
    }

    /// Attach a publisher; its metrics go to this session's collector
    pub fn with_publisher(mut self, publisher: SyncPublisher) -> Self {
        self.publisher = Some(publisher.with_metrics(self.metrics.clone()));
        self
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// The session's snapshot of the dataset
    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn publisher(&self) -> Option<&SyncPublisher> {
        self.publisher.as_ref()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Values the user can choose from in each category
    pub fn options(&self) -> CategoryOptions {
        CategoryOptions::from_records(&self.records)
    }

    /// Every value selected; the initial view
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::all(&self.records)
    }

    pub fn view(&self, selection: &FilterSelection) -> DashboardView {
        let timer = Timer::now();

        let filtered = filter(&self.records, selection);
        let stats = FilterStats::new(self.records.len(), filtered.len());
        let grouped = aggregate(&filtered);
        let metrics = KeyMetrics::compute(&filtered);

        self.metrics.record(ids::ROWS_IN, stats.rows_in as f64);
        self.metrics.record(ids::ROWS_OUT, stats.rows_out as f64);
        self.metrics.record(ids::SELECTIVITY, stats.selectivity);
        self.metrics.record(ids::GROUPS, grouped.len() as f64);
        self.metrics.record(ids::VIEW_MS, timer.elapsed_ms());

        debug!(
            stage = %PipelineStage::Filter,
            rows_in = stats.rows_in,
            rows_out = stats.rows_out,
            groups = grouped.len(),
            "View computed"
        );

        DashboardView {
            records: self.records.clone(),
            filtered,
            grouped,
            metrics,
            stats,
        }
    }

    /// Add a record to the dataset
    ///
    /// Validation and re-read failures come back as `Err` with nothing
    /// written. Once the write has started the result is a
    /// [`PublishOutcome`]; the session's snapshot is replaced by the written
    /// sequence whenever that sequence reached the disk.
    pub fn add_record(&mut self, input: RecordInput) -> Result<PublishOutcome, StoreError> {
        let records = self.store.prepare_append(input)?;

        let outcome = match self.publisher.as_mut() {
            Some(publisher) => publisher.publish(&self.store, &records),
            None => match self.store.flush(&records) {
                Ok(()) => {
                    self.metrics.increment(ids::PUBLISH_LOCAL_ONLY);
                    PublishOutcome::LocalOnly
                }
                Err(err) => {
                    self.metrics.increment(ids::PUBLISH_LOCAL_FAILURE);
                    PublishOutcome::LocalFailure(err)
                }
            },
        };

        if outcome.is_durable() {
            self.metrics.increment(ids::RECORDS_APPENDED);
            self.records = records;
        }

        info!(
            stage = %PipelineStage::Storage,
            rows = self.records.len(),
            durable = outcome.is_durable(),
            synced = outcome.is_synced(),
            "Record added"
        );
        Ok(outcome)
    }

    /// Re-read the backing file, picking up changes from other writers
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let timer = Timer::now();
        self.records = self.store.load()?;
        self.metrics.record(ids::LOAD_MS, timer.elapsed_ms());
        Ok(())
    }
}
