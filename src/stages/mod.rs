//! Pipeline stages
//!
//! Stages are grouped the way the data moves through them: storage loads and
//! flushes the dataset file, execution narrows and summarizes records, and
//! distribution pushes the persisted file to a remote mirror.

pub mod distribution;
pub mod execution;
pub mod storage;

use serde::{Deserialize, Serialize};

/// Pipeline stage enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Loading and flushing the backing file
    Storage,
    /// Filtering records by category selection
    Filter,
    /// Grouped sums and key metrics
    Aggregate,
    /// Remote mirror synchronization
    Distribution,
}

impl PipelineStage {
    /// Human-readable name for the stage
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStage::Storage => "Storage",
            PipelineStage::Filter => "Filter",
            PipelineStage::Aggregate => "Aggregate",
            PipelineStage::Distribution => "Distribution",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
