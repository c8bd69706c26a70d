//! Validation results
//!
//! Accumulates errors and warnings while checking user input so every
//! problem can be reported in one pass.

use serde::{Deserialize, Serialize};

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether validation passed
    pub valid: bool,
    /// Error messages
    pub errors: Vec<String>,
    /// Warning messages
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a validation result with an error
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![msg.into()],
            warnings: Vec::new(),
        }
    }

    /// Add a warning to the validation result
    pub fn with_warning(mut self, msg: impl Into<String>) -> Self {
        self.warnings.push(msg.into());
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Merge another validation result into this one
    pub fn merge(mut self, other: ValidationResult) -> Self {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_invalid() {
        let merged = ValidationResult::ok()
            .with_warning("trimmed")
            .merge(ValidationResult::error("empty color"));

        assert!(!merged.valid);
        assert!(merged.has_errors());
        assert!(merged.has_warnings());
        assert_eq!(merged.errors, vec!["empty color".to_string()]);
    }

    #[test]
    fn test_merge_of_oks_is_ok() {
        let merged = ValidationResult::ok().merge(ValidationResult::ok());
        assert!(merged.valid);
        assert!(!merged.has_errors());
    }
}
