//! Rule evaluation errors and non-fatal error collection.

use super::error_code::{self, LintelErrorCode};
use super::StorageError;

/// Errors that can occur while a validation cycle runs.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("rule {rule_id} has invalid logic: {message}")]
    InvalidRuleLogic { rule_id: String, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cycle timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("cycle cancelled")]
    Cancelled,
}

impl LintelErrorCode for EvaluationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRuleLogic { .. } => error_code::EVALUATION_ERROR,
            Self::Storage(e) => e.error_code(),
            Self::Timeout { .. } => error_code::TIMEOUT,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of an evaluation pass that accumulates non-fatal errors.
/// A rule with unparseable logic fails alone; the cycle still completes
/// with the remaining rules' findings.
#[derive(Debug, Default)]
pub struct EvaluationReport<T: Default = ()> {
    pub data: T,
    pub errors: Vec<EvaluationError>,
}

impl<T: Default> EvaluationReport<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: EvaluationError) {
        self.errors.push(error);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
