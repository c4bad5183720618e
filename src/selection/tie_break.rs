//! Tie-break answers: explicit caller choices the cardinality rules cannot
//! infer.
//!
//! Each answer parses from the wire form the presentation layer sends
//! ("single", "state", "multiple", ...); anything else is rejected at the
//! boundary with [`EngineError::UnknownTieBreak`] rather than defaulted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Under `domain = TOTAL`: compare one data item across categories, or
/// several comparable items against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    Single,
    Multiple,
}

impl FromStr for CompareMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(CompareMode::Single),
            "multiple" => Ok(CompareMode::Multiple),
            other => Err(EngineError::UnknownTieBreak {
                question: "compare_mode",
                answer: other.to_string(),
            }),
        }
    }
}

/// For a bar chart where states and years are both multi (or both single):
/// which of the two runs along the category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarAxis {
    State,
    Year,
}

impl FromStr for BarAxis {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "state" => Ok(BarAxis::State),
            "year" => Ok(BarAxis::Year),
            other => Err(EngineError::UnknownTieBreak {
                question: "axis",
                answer: other.to_string(),
            }),
        }
    }
}

/// For a line chart with several states chosen: one line per state, or all
/// chosen states aggregated into a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineLayout {
    Multiple,
    One,
}

impl FromStr for LineLayout {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple" => Ok(LineLayout::Multiple),
            "one" => Ok(LineLayout::One),
            other => Err(EngineError::UnknownTieBreak {
                question: "lines",
                answer: other.to_string(),
            }),
        }
    }
}

/// The caller's accumulated tie-break answers, all optional.
///
/// Travels next to the [`Selection`](crate::selection::Selection); the
/// planner asks for whichever answer it is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreaks {
    pub compare_mode: Option<CompareMode>,
    pub bar_axis: Option<BarAxis>,
    pub line_layout: Option<LineLayout>,
}

impl TieBreaks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.compare_mode = Some(mode);
        self
    }

    pub fn with_bar_axis(mut self, axis: BarAxis) -> Self {
        self.bar_axis = Some(axis);
        self
    }

    pub fn with_line_layout(mut self, layout: LineLayout) -> Self {
        self.line_layout = Some(layout);
        self
    }
}
