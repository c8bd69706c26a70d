//! CSV Dataset Store
//!
//! Owns the path of the backing file and moves the full record sequence
//! between that file and memory.
//!
//! ## File format
//!
//! A header row with exactly the six [`COLUMNS`], followed by one data row per
//! record. Quantities are base-10 non-negative integers. A single bad row
//! rejects the whole load; there is no schema inference.
//!
//! ## Writes
//!
//! Every write replaces the whole file. The new contents go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! failed write leaves the previous file untouched.
//!
//! ## Concurrent writers
//!
//! The file is not locked. [`DatasetStore::append`] re-reads the file right
//! before writing so rows added by other processes since the session loaded
//! are kept, but two appends racing between read and rename can still lose
//! one of the rows.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::StoreError;
use crate::core::record::{InventoryRecord, RecordInput, COLUMNS};
use crate::stages::PipelineStage;

/// Handle to the dataset's backing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the backing file
    pub fn load(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let file = std::fs::File::open(&self.path).map_err(|e| StoreError::read(&self.path, e))?;
        let records = decode(file).map_err(|reason| StoreError::read(&self.path, reason))?;

        debug!(
            stage = %PipelineStage::Storage,
            path = %self.path.display(),
            rows = records.len(),
            "Loaded dataset"
        );
        Ok(records)
    }

    /// Replace the backing file with `records`
    pub fn flush(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        let bytes = encode(records).map_err(|e| StoreError::write(&self.path, e))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".inventory-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StoreError::write(&self.path, e))?;

        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::write(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::write(&self.path, e.error))?;

        info!(
            stage = %PipelineStage::Storage,
            path = %self.path.display(),
            rows = records.len(),
            "Flushed dataset"
        );
        Ok(())
    }

    /// Validate `input` and return the current file contents with it appended
    ///
    /// Nothing is written. The sequence is built from a fresh read of the
    /// backing file, not from any copy held by the caller.
    pub fn prepare_append(&self, input: RecordInput) -> Result<Vec<InventoryRecord>, StoreError> {
        let record = input.into_record()?;
        let mut records = self.load()?;
        records.push(record);
        Ok(records)
    }

    /// Validate, re-read, append and flush
    ///
    /// Returns the sequence that was written.
    pub fn append(&self, input: RecordInput) -> Result<Vec<InventoryRecord>, StoreError> {
        let records = self.prepare_append(input)?;
        self.flush(&records)?;
        Ok(records)
    }

    /// Raw bytes of the backing file as currently on disk
    pub fn read_bytes(&self) -> Result<Vec<u8>, StoreError> {
        std::fs::read(&self.path).map_err(|e| StoreError::read(&self.path, e))
    }
}

/// Parse a dataset from any reader
pub fn decode<R: std::io::Read>(reader: R) -> Result<Vec<InventoryRecord>, String> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers().map_err(|e| e.to_string())?;
    if !headers.iter().eq(COLUMNS.iter().copied()) {
        return Err(format!(
            "expected header [{}], found [{}]",
            COLUMNS.join(", "),
            headers.iter().collect::<Vec<_>>().join(", ")
        ));
    }

    reader
        .deserialize::<InventoryRecord>()
        .map(|row| row.map_err(|e| e.to_string()))
        .collect()
}

/// Serialize a dataset in the fixed column order, header included
pub fn encode(records: &[InventoryRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}
