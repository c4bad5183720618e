//! Read-only SQLite fact store for irrigation census observations.
//!
//! One table, `facts`, loaded once from the ETL output and queried three
//! ways: distinct values of a column under a filter, the comparable-item
//! lookup for the TOTAL domain, and grouped aggregates. All filters are
//! parameterized; callers never splice values into SQL.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::Statistic;
use crate::selection::{Dimension, Selection};

/// Errors from fact store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine home directory for the default store path")]
    NoHomeDir,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One observation: a value at a point in the six-dimension space.
///
/// The six key columns are unique together; loading a duplicate fails with
/// the constraint error rather than silently merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub state_id: String,
    pub year: String,
    pub commodity: String,
    pub data_item: String,
    pub domain: String,
    pub domain_category: String,
    pub value: f64,
}

/// One row of a grouped aggregate: the grouping key values (in `group_by`
/// order) and the aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub keys: Vec<String>,
    pub value: f64,
}

/// SQLite-backed store of irrigation facts.
pub struct FactStore {
    conn: Connection,
}

impl FactStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Default store location: `~/.furrow/irrigation.db`.
    pub fn default_path() -> StoreResult<PathBuf> {
        let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(home.join(".furrow").join("irrigation.db"))
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS facts (
                state_id        TEXT NOT NULL,
                year            TEXT NOT NULL,
                commodity       TEXT NOT NULL,
                data_item       TEXT NOT NULL,
                domain          TEXT NOT NULL,
                domain_category TEXT NOT NULL,
                value           REAL NOT NULL,
                PRIMARY KEY (state_id, year, commodity, data_item,
                             domain, domain_category)
            );",
        )?;
        Ok(())
    }

    /// Bulk-load facts inside a single transaction.
    ///
    /// A duplicate key aborts the whole load with the constraint error.
    pub fn load(&mut self, facts: &[Fact]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO facts
                   (state_id, year, commodity, data_item, domain,
                    domain_category, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for fact in facts {
                stmt.execute(rusqlite::params![
                    fact.state_id,
                    fact.year,
                    fact.commodity,
                    fact.data_item,
                    fact.domain,
                    fact.domain_category,
                    fact.value,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Distinct values of a dimension's column under the given filter,
    /// ascending.
    pub fn distinct(&self, dim: Dimension, filter: &Selection) -> StoreResult<Vec<String>> {
        let (where_sql, params) = where_clause(filter);
        let sql = format!(
            "SELECT DISTINCT {col} FROM facts{where_sql} ORDER BY {col}",
            col = dim.column(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| row.get(0))?;
        rows.collect::<Result<Vec<String>, _>>().map_err(Into::into)
    }

    /// Distinct data items under the filter whose name ends with `unit`,
    /// excluding the items in `exclude`, ascending.
    pub fn comparable_items(
        &self,
        filter: &Selection,
        exclude: &[String],
        unit: &str,
    ) -> StoreResult<Vec<String>> {
        let (where_sql, mut params) = where_clause(filter);
        let connective = if where_sql.is_empty() { " WHERE" } else { " AND" };
        let mut sql = format!(
            "SELECT DISTINCT data_item FROM facts{where_sql}{connective} \
             data_item LIKE '%' || ?",
        );
        params.push(unit.to_string());
        if !exclude.is_empty() {
            let placeholders = vec!["?"; exclude.len()].join(", ");
            sql.push_str(&format!(" AND data_item NOT IN ({placeholders})"));
            params.extend(exclude.iter().cloned());
        }
        sql.push_str(" ORDER BY data_item");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| row.get(0))?;
        rows.collect::<Result<Vec<String>, _>>().map_err(Into::into)
    }

    /// Grouped aggregate of `value` under the filter, one row per grouping
    /// key combination, ordered by the grouping columns ascending.
    pub fn aggregate(
        &self,
        statistic: Statistic,
        filter: &Selection,
        group_by: &[Dimension],
    ) -> StoreResult<Vec<AggregateRow>> {
        let (where_sql, params) = where_clause(filter);
        let key_count = group_by.len();
        let sql = if group_by.is_empty() {
            format!(
                "SELECT {agg}(value) FROM facts{where_sql}",
                agg = statistic.as_sql(),
            )
        } else {
            let cols: Vec<&str> = group_by.iter().map(|d| d.column()).collect();
            let cols = cols.join(", ");
            format!(
                "SELECT {cols}, {agg}(value) FROM facts{where_sql} \
                 GROUP BY {cols} ORDER BY {cols}",
                agg = statistic.as_sql(),
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let mut keys = Vec::with_capacity(key_count);
            for i in 0..key_count {
                keys.push(row.get::<_, String>(i)?);
            }
            let value: f64 = row.get(key_count)?;
            Ok(AggregateRow { keys, value })
        })?;
        rows.collect::<Result<Vec<AggregateRow>, _>>()
            .map_err(Into::into)
    }
}

/// Build a parameterized WHERE clause from every set dimension of the
/// filter. Callers fold synthetic dimensions into real ones first, so each
/// column appears at most once.
fn where_clause(filter: &Selection) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();
    for dim in filter.dimensions() {
        let values = filter.values(dim);
        let placeholders = vec!["?"; values.len()].join(", ");
        clauses.push(format!("{} IN ({placeholders})", dim.column()));
        params.extend(values.iter().cloned());
    }
    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}
