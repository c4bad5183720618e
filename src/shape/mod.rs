//! Executing a query descriptor and folding the rows into chart-ready
//! values.
//!
//! Bar charts take the aggregate values flat, one per group. Line charts
//! slice the rows into one vector per series: the store orders rows by the
//! grouping columns with `year` last, so each consecutive run of `|years|`
//! rows is one series with its years ascending. A row count that is not an
//! exact multiple of the year count means the data rectangle is incomplete
//! and shaping fails rather than mislabeling points.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::plan::{ChartShape, QueryDescriptor};
use crate::selection::Dimension;
use crate::store::FactStore;

/// Aggregate values folded for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shaped {
    /// One value per bar, in group-key order.
    Bar(Vec<f64>),
    /// One vector per series; within a series, one value per year ascending.
    Lines(Vec<Vec<f64>>),
}

/// Run the descriptor's aggregate query and shape the result.
pub fn execute(store: &FactStore, descriptor: &QueryDescriptor) -> EngineResult<Shaped> {
    let rows = store.aggregate(
        descriptor.statistic,
        &descriptor.filters,
        &descriptor.group_by,
    )?;
    match descriptor.chart {
        ChartShape::Bar => Ok(Shaped::Bar(rows.into_iter().map(|row| row.value).collect())),
        ChartShape::Line => {
            let years = descriptor.filters.values(Dimension::Year).len();
            if years == 0 || rows.len() % years != 0 {
                return Err(EngineError::ShapeMismatch {
                    rows: rows.len(),
                    years,
                });
            }
            let values: Vec<f64> = rows.into_iter().map(|row| row.value).collect();
            let series = values
                .chunks(years)
                .map(|chunk| chunk.to_vec())
                .collect();
            Ok(Shaped::Lines(series))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Statistic;
    use crate::selection::Selection;
    use crate::store::Fact;

    fn fact(state: &str, year: &str, value: f64) -> Fact {
        Fact {
            state_id: state.to_string(),
            year: year.to_string(),
            commodity: "WATER".to_string(),
            data_item: "WATER APPLIED".to_string(),
            domain: "IRRIGATION STATUS".to_string(),
            domain_category: "IRRIGATED".to_string(),
            value,
        }
    }

    fn descriptor(chart: ChartShape, filters: Selection, group_by: Vec<Dimension>) -> QueryDescriptor {
        QueryDescriptor {
            statistic: Statistic::Sum,
            chart,
            filters,
            group_by,
        }
    }

    #[test]
    fn test_line_rows_chunk_into_per_state_series() {
        let mut store = FactStore::open_in_memory().unwrap();
        store
            .load(&[
                fact("CA", "2013", 1.0),
                fact("CA", "2018", 2.0),
                fact("TX", "2013", 3.0),
                fact("TX", "2018", 4.0),
            ])
            .unwrap();
        let filters = Selection::new()
            .with(Dimension::StateId, ["CA", "TX"])
            .with(Dimension::Year, ["2013", "2018"]);
        let desc = descriptor(
            ChartShape::Line,
            filters,
            vec![Dimension::StateId, Dimension::Year],
        );
        let shaped = execute(&store, &desc).unwrap();
        assert_eq!(
            shaped,
            Shaped::Lines(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
        );
    }

    #[test]
    fn test_incomplete_rectangle_is_a_shape_mismatch() {
        let mut store = FactStore::open_in_memory().unwrap();
        // TX is missing 2018, so 3 rows cannot split into 2-year series.
        store
            .load(&[
                fact("CA", "2013", 1.0),
                fact("CA", "2018", 2.0),
                fact("TX", "2013", 3.0),
            ])
            .unwrap();
        let filters = Selection::new()
            .with(Dimension::StateId, ["CA", "TX"])
            .with(Dimension::Year, ["2013", "2018"]);
        let desc = descriptor(
            ChartShape::Line,
            filters,
            vec![Dimension::StateId, Dimension::Year],
        );
        let err = execute(&store, &desc).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ShapeMismatch { rows: 3, years: 2 }
        ));
    }

    #[test]
    fn test_bar_values_are_flat_in_group_order() {
        let mut store = FactStore::open_in_memory().unwrap();
        store
            .load(&[
                fact("CA", "2018", 2.0),
                fact("TX", "2018", 4.0),
            ])
            .unwrap();
        let filters = Selection::new().with(Dimension::Year, ["2018"]);
        let desc = descriptor(ChartShape::Bar, filters, vec![Dimension::StateId]);
        let shaped = execute(&store, &desc).unwrap();
        assert_eq!(shaped, Shaped::Bar(vec![2.0, 4.0]));
    }
}
