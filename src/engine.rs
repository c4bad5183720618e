//! The engine facade: one handle tying the fact store to facet resolution,
//! reconciliation, planning, and execution.
//!
//! Every method takes the caller's [`Selection`] and [`TieBreaks`] as
//! arguments and holds no session state, so one engine serves any number
//! of concurrent sessions.

use std::path::Path;

use crate::config::{Quotas, Settings};
use crate::error::EngineResult;
use crate::facet::FacetResolver;
use crate::plan::{self, ChartShape, PlanOutcome, QueryDescriptor, Statistic};
use crate::selection::{reconcile, Dimension, Reconciled, Selection, TieBreaks};
use crate::shape::{self, Shaped};
use crate::store::FactStore;

pub struct Engine {
    store: FactStore,
    quotas: Quotas,
}

impl Engine {
    /// Wrap an already-open store with default quotas.
    pub fn new(store: FactStore) -> Self {
        Self {
            store,
            quotas: Quotas::default(),
        }
    }

    /// Open the store named by the settings (or the default location) and
    /// apply the configured quotas.
    pub fn from_settings(settings: &Settings) -> EngineResult<Self> {
        let store = match &settings.store.path {
            Some(path) => FactStore::open(Path::new(path))?,
            None => FactStore::open(&FactStore::default_path()?)?,
        };
        Ok(Self {
            store,
            quotas: settings.quotas.clone(),
        })
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    /// The legal values of a dimension under the current selection.
    pub fn legal_values(
        &self,
        dim: Dimension,
        selection: &Selection,
        ties: &TieBreaks,
    ) -> EngineResult<Vec<String>> {
        FacetResolver::new(&self.store).legal_values(dim, selection, ties)
    }

    /// Resolve a dimension's facet and reconcile the previously chosen
    /// values against it, applying the configured quota.
    pub fn reconcile(
        &self,
        dim: Dimension,
        selection: &Selection,
        ties: &TieBreaks,
        previous: &[String],
    ) -> EngineResult<Reconciled> {
        let candidates = self.legal_values(dim, selection, ties)?;
        let quota = self.quotas.for_dimension(dim).unwrap_or(usize::MAX);
        Ok(reconcile(&candidates, previous, quota))
    }

    /// Plan an aggregate query over the selection.
    pub fn plan(
        &self,
        selection: &Selection,
        chart: ChartShape,
        statistic: Statistic,
        ties: &TieBreaks,
    ) -> EngineResult<PlanOutcome> {
        plan::plan(selection, chart, statistic, ties)
    }

    /// Execute a planned query and shape the result.
    pub fn execute(&self, descriptor: &QueryDescriptor) -> EngineResult<Shaped> {
        shape::execute(&self.store, descriptor)
    }

    /// Drop stale values from a selection.
    ///
    /// Walks the dimensions in upstream order, resolving each facet against
    /// the values validated so far and keeping only the still-legal
    /// choices. The result is what the planner should be fed after any
    /// upstream edit.
    pub fn revalidate(&self, selection: &Selection, ties: &TieBreaks) -> EngineResult<Selection> {
        let resolver = FacetResolver::new(&self.store);
        let mut validated = Selection::new();
        for dim in Dimension::ALL {
            if !selection.is_set(dim) {
                continue;
            }
            let candidates = resolver.legal_values(dim, &validated, ties)?;
            let quota = self.quotas.for_dimension(dim).unwrap_or(usize::MAX);
            let outcome = reconcile(&candidates, selection.values(dim), quota);
            validated.set(dim, outcome.retained);
        }
        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Fact;

    fn fact(state: &str, year: &str, item: &str) -> Fact {
        Fact {
            state_id: state.to_string(),
            year: year.to_string(),
            commodity: "WATER".to_string(),
            data_item: item.to_string(),
            domain: "IRRIGATION STATUS".to_string(),
            domain_category: "IRRIGATED".to_string(),
            value: 1.0,
        }
    }

    fn engine() -> Engine {
        let mut store = FactStore::open_in_memory().unwrap();
        store
            .load(&[
                fact("CA", "2013", "WATER APPLIED"),
                fact("CA", "2018", "WATER APPLIED"),
                fact("TX", "2018", "WATER APPLIED"),
            ])
            .unwrap();
        Engine::new(store)
    }

    #[test]
    fn test_revalidate_drops_years_invalidated_by_a_new_state() {
        let engine = engine();
        // 2013 was legal for CA alone; adding TX invalidates it.
        let sel = Selection::new()
            .with(Dimension::StateId, ["CA", "TX"])
            .with(Dimension::Commodity, ["WATER"])
            .with(Dimension::Domain, ["IRRIGATION STATUS"])
            .with(Dimension::DataItem, ["WATER APPLIED"])
            .with(Dimension::DomainCategory, ["IRRIGATED"])
            .with(Dimension::Year, ["2013", "2018"]);
        let validated = engine.revalidate(&sel, &TieBreaks::new()).unwrap();
        assert_eq!(validated.values(Dimension::Year), ["2018"]);
        assert_eq!(validated.values(Dimension::StateId), ["CA", "TX"]);
    }

    #[test]
    fn test_reconcile_applies_configured_quota() {
        let engine = engine();
        let out = engine
            .reconcile(
                Dimension::StateId,
                &Selection::new(),
                &TieBreaks::new(),
                &["CA".to_string(), "NV".to_string()],
            )
            .unwrap();
        assert_eq!(out.retained, ["CA"]);
        assert!(out.disabled.is_empty());
    }
}
