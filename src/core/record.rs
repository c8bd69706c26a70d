//! Inventory record types
//!
//! This module defines the row type stored in the dataset file, the key used
//! to group rows for aggregation, and the unvalidated input shape that new
//! rows arrive in from the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::TryFromIntError;

use super::validation::ValidationResult;

/// Column headers of the backing file, in the fixed on-disk order.
pub const COLUMNS: [&str; 6] = [
    "Block Type",
    "Block Shape",
    "Dimensions",
    "Block Color",
    "Available Quantity",
    "Sold Out",
];

/// One inventory row
///
/// Records carry no identity: two rows with identical fields are both kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(rename = "Block Type")]
    pub block_type: String,
    #[serde(rename = "Block Shape")]
    pub block_shape: String,
    #[serde(rename = "Dimensions")]
    pub dimensions: String,
    #[serde(rename = "Block Color")]
    pub block_color: String,
    #[serde(rename = "Available Quantity")]
    pub available_quantity: u64,
    #[serde(rename = "Sold Out")]
    pub sold_out: u64,
}

impl InventoryRecord {
    /// Create a record from already-checked values
    pub fn new(
        block_type: impl Into<String>,
        block_shape: impl Into<String>,
        dimensions: impl Into<String>,
        block_color: impl Into<String>,
        available_quantity: u64,
        sold_out: u64,
    ) -> Self {
        Self {
            block_type: block_type.into(),
            block_shape: block_shape.into(),
            dimensions: dimensions.into(),
            block_color: block_color.into(),
            available_quantity,
            sold_out,
        }
    }

    /// The (type, color) pair this record is aggregated under
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            block_type: self.block_type.clone(),
            block_color: self.block_color.clone(),
        }
    }
}

impl fmt::Display for InventoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {}, {})",
            self.block_type,
            self.block_shape,
            self.dimensions,
            self.block_color,
            self.available_quantity,
            self.sold_out
        )
    }
}

/// Aggregation bucket key
///
/// Ordered by type first, then color, which is the order grouped results are
/// presented in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub block_type: String,
    pub block_color: String,
}

impl GroupKey {
    pub fn new(block_type: impl Into<String>, block_color: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            block_color: block_color.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.block_type, self.block_color)
    }
}

/// A record as entered by a user, before validation
///
/// Quantities are signed here because form inputs can produce negative
/// numbers; [`RecordInput::into_record`] rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    pub block_type: String,
    pub block_shape: String,
    pub dimensions: String,
    pub block_color: String,
    pub available_quantity: i64,
    pub sold_out: i64,
}

impl RecordInput {
    pub fn new(
        block_type: impl Into<String>,
        block_shape: impl Into<String>,
        dimensions: impl Into<String>,
        block_color: impl Into<String>,
        available_quantity: i64,
        sold_out: i64,
    ) -> Self {
        Self {
            block_type: block_type.into(),
            block_shape: block_shape.into(),
            dimensions: dimensions.into(),
            block_color: block_color.into(),
            available_quantity,
            sold_out,
        }
    }

    /// Check presence of every text field and the sign of both quantities
    ///
    /// All problems are collected, so a form can show them together.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let text_fields = [
            ("block type", &self.block_type),
            ("block shape", &self.block_shape),
            ("dimensions", &self.dimensions),
            ("block color", &self.block_color),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                result = result.merge(ValidationResult::error(format!("{} must not be empty", name)));
            } else if value.trim() != value.as_str() {
                result = result.with_warning(format!(
                    "{} has surrounding whitespace and is stored trimmed",
                    name
                ));
            }
        }

        if self.available_quantity < 0 {
            result = result.merge(ValidationResult::error(format!(
                "available quantity must be >= 0, got {}",
                self.available_quantity
            )));
        }
        if self.sold_out < 0 {
            result = result.merge(ValidationResult::error(format!(
                "sold out must be >= 0, got {}",
                self.sold_out
            )));
        }

        result
    }

    /// Validate and convert into a storable record
    pub fn into_record(self) -> Result<InventoryRecord, super::error::ValidationError> {
        let result = self.validate();
        if !result.valid {
            return Err(super::error::ValidationError::new(result.errors));
        }

        // Both quantities are known to be non-negative at this point.
        Ok(InventoryRecord {
            block_type: self.block_type.trim().to_string(),
            block_shape: self.block_shape.trim().to_string(),
            dimensions: self.dimensions.trim().to_string(),
            block_color: self.block_color.trim().to_string(),
            available_quantity: self.available_quantity.unsigned_abs(),
            sold_out: self.sold_out.unsigned_abs(),
        })
    }
}

/// Fails when a quantity does not fit the signed input range
impl TryFrom<InventoryRecord> for RecordInput {
    type Error = TryFromIntError;

    fn try_from(record: InventoryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            available_quantity: i64::try_from(record.available_quantity)?,
            sold_out: i64::try_from(record.sold_out)?,
            block_type: record.block_type,
            block_shape: record.block_shape,
            dimensions: record.dimensions,
            block_color: record.block_color,
        })
    }
}
