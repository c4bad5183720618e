//! The aggregation planner: from a complete selection to either a tie-break
//! question or an executable query descriptor.
//!
//! The grouping decision is a single tree over selection cardinalities:
//!
//! ```text
//! domain_category multi ──────────► group by domain_category (+ year, line)
//! effective data_item multi ──────► group by data_item       (+ year, line)
//! bar:  exactly one of state/year multi ──► group by it
//!       both or neither multi ───────────► ask BarAxis
//! line: one state ────────────────────────► group by year
//!       several states ──────────────────► ask LineLayout
//! ```
//!
//! Every caller that needs to know "can this selection chart yet" calls
//! [`plan`]; there is no second copy of these rules anywhere.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::facet::total;
use crate::selection::{BarAxis, CompareMode, Dimension, LineLayout, Selection, TieBreaks};

/// The aggregate applied to `value` within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Min,
    Max,
    Avg,
    Sum,
}

impl Statistic {
    /// The SQL aggregate function name.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Statistic::Min => "MIN",
            Statistic::Max => "MAX",
            Statistic::Avg => "AVG",
            Statistic::Sum => "SUM",
        }
    }
}

/// The chart the caller intends to render; decides the grouping shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartShape {
    Bar,
    Line,
}

/// The question the planner needs answered before it can produce a
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakQuestion {
    /// `domain = TOTAL`: compare a single item or multiple comparable items?
    CompareMode,
    /// Bar with states and years both multi (or both single): which axis?
    BarAxis,
    /// Line with several states: one line per state, or one line overall?
    LineLayout,
}

/// An executable aggregate query: filters, grouping, statistic, and the
/// chart shape the result will be folded into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub statistic: Statistic,
    pub chart: ChartShape,
    /// Effective filters: comparable items folded into `data_item`, the
    /// synthetic dimension cleared.
    pub filters: Selection,
    /// Grouping dimensions; the series key first, `year` last for lines.
    pub group_by: Vec<Dimension>,
}

/// The planner's verdict on a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// The cardinality rules cannot decide; ask the caller this question.
    NeedsTieBreak(TieBreakQuestion),
    /// The selection charts unambiguously; run this query.
    Ready(QueryDescriptor),
}

/// Plan an aggregate query over a complete selection.
///
/// Returns `IncompleteSelection` naming the first missing required
/// dimension (in upstream order) if called early; facet resolution, not the
/// planner, is how callers should discover what to ask for next.
pub fn plan(
    selection: &Selection,
    chart: ChartShape,
    statistic: Statistic,
    ties: &TieBreaks,
) -> EngineResult<PlanOutcome> {
    for dim in [
        Dimension::StateId,
        Dimension::Commodity,
        Dimension::Domain,
        Dimension::DataItem,
    ] {
        if !selection.is_set(dim) {
            return Err(EngineError::IncompleteSelection(dim));
        }
    }

    let is_total = total::is_total_domain(selection);
    let compare_multiple = match (is_total, ties.compare_mode) {
        (true, None) => return Ok(PlanOutcome::NeedsTieBreak(TieBreakQuestion::CompareMode)),
        (true, Some(mode)) => mode == CompareMode::Multiple,
        (false, _) => false,
    };

    if !is_total && !selection.is_set(Dimension::DomainCategory) {
        return Err(EngineError::IncompleteSelection(Dimension::DomainCategory));
    }
    if compare_multiple && !selection.is_set(Dimension::ComparableDataItem) {
        return Err(EngineError::IncompleteSelection(
            Dimension::ComparableDataItem,
        ));
    }
    if !selection.is_set(Dimension::Year) {
        return Err(EngineError::IncompleteSelection(Dimension::Year));
    }

    let effective_items = total::effective_data_items(selection, ties);
    let category_multi = !is_total && selection.cardinality(Dimension::DomainCategory).is_multi();
    let item_multi = effective_items.len() > 1;
    let state_multi = selection.cardinality(Dimension::StateId).is_multi();
    let year_multi = selection.cardinality(Dimension::Year).is_multi();

    let group_by = if category_multi {
        with_year_for_line(Dimension::DomainCategory, chart)
    } else if item_multi {
        with_year_for_line(Dimension::DataItem, chart)
    } else {
        match chart {
            // Exactly one of state/year multi picks the axis; both multi or
            // both single is genuinely ambiguous and needs an answer.
            ChartShape::Bar if state_multi != year_multi => {
                if state_multi {
                    vec![Dimension::StateId]
                } else {
                    vec![Dimension::Year]
                }
            }
            ChartShape::Bar => match ties.bar_axis {
                None => return Ok(PlanOutcome::NeedsTieBreak(TieBreakQuestion::BarAxis)),
                Some(BarAxis::State) => vec![Dimension::StateId],
                Some(BarAxis::Year) => vec![Dimension::Year],
            },
            ChartShape::Line if !state_multi => vec![Dimension::Year],
            ChartShape::Line => match ties.line_layout {
                None => return Ok(PlanOutcome::NeedsTieBreak(TieBreakQuestion::LineLayout)),
                Some(LineLayout::Multiple) => vec![Dimension::StateId, Dimension::Year],
                Some(LineLayout::One) => vec![Dimension::Year],
            },
        }
    };

    let filters = effective_filters(selection, &effective_items, is_total);
    Ok(PlanOutcome::Ready(QueryDescriptor {
        statistic,
        chart,
        filters,
        group_by,
    }))
}

fn with_year_for_line(series: Dimension, chart: ChartShape) -> Vec<Dimension> {
    match chart {
        ChartShape::Bar => vec![series],
        ChartShape::Line => vec![series, Dimension::Year],
    }
}

/// Fold the synthetic comparable-item dimension into `data_item` and drop
/// the category filter under `domain = TOTAL` (every TOTAL row carries the
/// sentinel category).
fn effective_filters(selection: &Selection, effective_items: &[String], is_total: bool) -> Selection {
    let mut filters = selection.clone();
    filters.set(Dimension::DataItem, effective_items.iter().cloned());
    filters.clear(Dimension::ComparableDataItem);
    if is_total {
        filters.clear(Dimension::DomainCategory);
    }
    filters
}
