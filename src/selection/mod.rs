//! The typed selection surface: dimensions, cardinality classes, and the
//! caller-owned [`Selection`] value.
//!
//! A [`Selection`] is a fixed-shape map from [`Dimension`] to an ordered,
//! deduplicated set of chosen string values. It is built incrementally by
//! the caller (the presentation layer) across a session; the engine is a
//! pure function of it and never stores one. Unknown dimension keys are
//! unrepresentable - the key type is an enum.

mod reconcile;
mod tie_break;

pub use reconcile::{reconcile, Reconciled};
pub use tie_break::{BarAxis, CompareMode, LineLayout, TieBreaks};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named axis by which facts can be filtered and grouped.
///
/// The first six map one-to-one onto fact columns. `ComparableDataItem` is
/// synthetic: it exists only while `domain = TOTAL` with multiple-item
/// comparison, and its values are folded into the `data_item` filter before
/// any query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    StateId,
    Commodity,
    Domain,
    DataItem,
    DomainCategory,
    Year,
    ComparableDataItem,
}

impl Dimension {
    /// All dimensions, in upstream resolution order.
    pub const ALL: [Dimension; 7] = [
        Dimension::StateId,
        Dimension::Commodity,
        Dimension::Domain,
        Dimension::DataItem,
        Dimension::ComparableDataItem,
        Dimension::DomainCategory,
        Dimension::Year,
    ];

    /// The snake_case name used in serialized selections.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::StateId => "state_id",
            Dimension::Commodity => "commodity",
            Dimension::Domain => "domain",
            Dimension::DataItem => "data_item",
            Dimension::DomainCategory => "domain_category",
            Dimension::Year => "year",
            Dimension::ComparableDataItem => "comparable_data_item",
        }
    }

    /// The fact-store column this dimension filters or groups.
    ///
    /// The synthetic comparable-item dimension reads and writes the
    /// `data_item` column.
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::ComparableDataItem => "data_item",
            other => other.as_str(),
        }
    }

    /// The per-dimension selection cap, where one applies.
    ///
    /// Multi-valued dimensions are capped so a chart stays readable: five
    /// states, five domain categories, five years, and four comparable items
    /// (the initially chosen data item plus four makes five items compared).
    /// Single-choice dimensions have no cap.
    pub fn quota(&self) -> Option<usize> {
        match self {
            Dimension::StateId => Some(5),
            Dimension::DomainCategory => Some(5),
            Dimension::Year => Some(5),
            Dimension::ComparableDataItem => Some(4),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a dimension's current selection is empty, one value, or several.
///
/// Drives almost all branching in the aggregation planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Unset,
    Singleton,
    Multi,
}

impl Cardinality {
    pub fn of(count: usize) -> Self {
        match count {
            0 => Cardinality::Unset,
            1 => Cardinality::Singleton,
            _ => Cardinality::Multi,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Cardinality::Multi)
    }
}

/// A partial user selection: dimension -> ordered set of chosen values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    values: BTreeMap<Dimension, Vec<String>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chosen values of a dimension, deduplicating while
    /// preserving the caller's order. Setting an empty list unsets the
    /// dimension.
    pub fn set<I, S>(&mut self, dim: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        if deduped.is_empty() {
            self.values.remove(&dim);
        } else {
            self.values.insert(dim, deduped);
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with<I, S>(mut self, dim: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(dim, values);
        self
    }

    /// Append one value if it is not already chosen.
    pub fn choose(&mut self, dim: Dimension, value: impl Into<String>) {
        let value = value.into();
        let entry = self.values.entry(dim).or_default();
        if !entry.contains(&value) {
            entry.push(value);
        }
    }

    /// Unset a dimension entirely.
    pub fn clear(&mut self, dim: Dimension) {
        self.values.remove(&dim);
    }

    /// The chosen values of a dimension, in choice order. Empty if unset.
    pub fn values(&self, dim: Dimension) -> &[String] {
        self.values.get(&dim).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first chosen value, if any.
    pub fn first(&self, dim: Dimension) -> Option<&str> {
        self.values(dim).first().map(String::as_str)
    }

    pub fn is_set(&self, dim: Dimension) -> bool {
        !self.values(dim).is_empty()
    }

    pub fn cardinality(&self, dim: Dimension) -> Cardinality {
        Cardinality::of(self.values(dim).len())
    }

    /// The set dimensions, in upstream order.
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        Dimension::ALL.into_iter().filter(|&dim| self.is_set(dim))
    }

    /// A copy containing only the named dimensions (those that are set).
    ///
    /// Facet resolution uses this to filter by a dimension's upstream
    /// prerequisites without being narrowed by downstream choices.
    pub fn restricted_to(&self, dims: &[Dimension]) -> Selection {
        let mut out = Selection::new();
        for &dim in dims {
            if let Some(values) = self.values.get(&dim) {
                out.values.insert(dim, values.clone());
            }
        }
        out
    }
}
