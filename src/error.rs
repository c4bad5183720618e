//! Unified error types for the engine.
//!
//! Facet resolution never fails on an incomplete selection - an unset
//! upstream dimension yields an empty legal set. The variants here cover
//! the failures that are real: store I/O, a planner invoked on a selection
//! that is still missing a required dimension, a tie-break answer outside
//! its enum, and an aggregate result that cannot be shaped.

use std::fmt;

use crate::selection::Dimension;
use crate::store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Unified error type for the engine.
#[derive(Debug)]
pub enum EngineError {
    /// The underlying fact store failed.
    Store(StoreError),

    /// The planner was invoked before a required dimension was chosen.
    ///
    /// Names the first missing dimension in upstream order. Callers should
    /// keep resolving facets until the selection is complete instead of
    /// planning early.
    IncompleteSelection(Dimension),

    /// A tie-break answer outside its enum was supplied at the planner
    /// boundary.
    UnknownTieBreak {
        /// Which question the answer was for ("compare_mode", "axis", "lines").
        question: &'static str,
        /// The rejected answer.
        answer: String,
    },

    /// The aggregate row count is not an exact multiple of the year count,
    /// so the rows cannot be sliced into per-series vectors.
    ShapeMismatch {
        rows: usize,
        years: usize,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Store(err) => {
                write!(f, "Fact store error: {}", err)
            }
            EngineError::IncompleteSelection(dim) => {
                write!(
                    f,
                    "Cannot plan: dimension '{}' has no selection yet",
                    dim.as_str()
                )
            }
            EngineError::UnknownTieBreak { question, answer } => {
                write!(
                    f,
                    "Unknown answer '{}' for tie-break question '{}'",
                    answer, question
                )
            }
            EngineError::ShapeMismatch { rows, years } => {
                write!(
                    f,
                    "Cannot shape result: {} rows is not a multiple of {} years",
                    rows, years
                )
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}
