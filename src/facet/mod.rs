//! Facet resolution: the legal values of each dimension given the current
//! partial selection.
//!
//! Dimensions resolve in a fixed upstream order (state, commodity, domain,
//! data item, category, year); a dimension's legal set is filtered by its
//! upstream prerequisites only, so a downstream choice never narrows an
//! upstream facet. An unset prerequisite yields an empty set, never an
//! error - the presentation layer just has nothing to offer yet.
//!
//! Most facets use union semantics over the chosen upstream values. Years
//! are the exception: a year is legal only if *every* chosen state and
//! *every* chosen series value has data for it, so any chartable query is
//! guaranteed a complete rectangle of observations.

pub mod total;

use std::collections::BTreeSet;

use crate::error::EngineResult;
use crate::selection::{CompareMode, Dimension, Selection, TieBreaks};
use crate::store::FactStore;

/// Resolves per-dimension legal value sets against a fact store.
pub struct FacetResolver<'a> {
    store: &'a FactStore,
}

impl<'a> FacetResolver<'a> {
    pub fn new(store: &'a FactStore) -> Self {
        Self { store }
    }

    /// The legal values of `dim` under the current selection, in the order
    /// the presentation layer should offer them.
    pub fn legal_values(
        &self,
        dim: Dimension,
        selection: &Selection,
        ties: &TieBreaks,
    ) -> EngineResult<Vec<String>> {
        match dim {
            Dimension::StateId => {
                let values = self.store.distinct(Dimension::StateId, &Selection::new())?;
                Ok(values)
            }
            Dimension::Commodity => self.distinct_after(
                Dimension::Commodity,
                selection,
                &[Dimension::StateId],
            ),
            Dimension::Domain => self.distinct_after(
                Dimension::Domain,
                selection,
                &[Dimension::StateId, Dimension::Commodity],
            ),
            Dimension::DataItem => self.distinct_after(
                Dimension::DataItem,
                selection,
                &[Dimension::StateId, Dimension::Commodity, Dimension::Domain],
            ),
            Dimension::DomainCategory => {
                if total::is_total_domain(selection) {
                    // No categories under TOTAL; the comparison axis is
                    // other same-unit data items, and only once the caller
                    // has opted into comparing multiple.
                    if ties.compare_mode == Some(CompareMode::Multiple) {
                        total::comparable_items(self.store, selection)
                    } else {
                        Ok(Vec::new())
                    }
                } else {
                    self.distinct_after(
                        Dimension::DomainCategory,
                        selection,
                        &[
                            Dimension::StateId,
                            Dimension::Commodity,
                            Dimension::Domain,
                            Dimension::DataItem,
                        ],
                    )
                }
            }
            Dimension::ComparableDataItem => total::comparable_items(self.store, selection),
            Dimension::Year => self.legal_years(selection, ties),
        }
    }

    /// Distinct values of `dim` filtered by the named upstream dimensions;
    /// empty if any of them is unset.
    fn distinct_after(
        &self,
        dim: Dimension,
        selection: &Selection,
        upstream: &[Dimension],
    ) -> EngineResult<Vec<String>> {
        if upstream.iter().any(|&dep| !selection.is_set(dep)) {
            return Ok(Vec::new());
        }
        let filter = selection.restricted_to(upstream);
        let values = self.store.distinct(dim, &filter)?;
        Ok(values)
    }

    /// Years with data for every chosen state and every chosen series
    /// value, ascending.
    ///
    /// Each dimension is intersected independently: one probe per chosen
    /// state with the other filters at their full sets, then one probe per
    /// series value with the states at their full set. A probe that pinned
    /// two dimensions at once would demand a year be covered by every
    /// (state, series value) pair, which is stricter than required.
    fn legal_years(&self, selection: &Selection, ties: &TieBreaks) -> EngineResult<Vec<String>> {
        let is_total = total::is_total_domain(selection);
        let upstream_set = [Dimension::StateId, Dimension::Commodity, Dimension::Domain]
            .iter()
            .all(|&dim| selection.is_set(dim))
            && selection.is_set(Dimension::DataItem)
            && (is_total || selection.is_set(Dimension::DomainCategory));
        if !upstream_set {
            return Ok(Vec::new());
        }
        if is_total && ties.compare_mode.is_none() {
            return Ok(Vec::new());
        }

        let items = total::effective_data_items(selection, ties);
        let categories: Vec<String> = if is_total {
            Vec::new()
        } else {
            selection.values(Dimension::DomainCategory).to_vec()
        };

        let mut base = selection.restricted_to(&[
            Dimension::StateId,
            Dimension::Commodity,
            Dimension::Domain,
        ]);
        base.set(Dimension::DataItem, items.iter().cloned());
        base.set(Dimension::DomainCategory, categories.iter().cloned());

        let mut legal: Option<BTreeSet<String>> = None;
        for state in selection.values(Dimension::StateId) {
            let mut filter = base.clone();
            filter.set(Dimension::StateId, [state.clone()]);
            legal = intersect(legal, self.year_set(&filter)?);
        }

        // The disambiguating series dimension: the data items if several
        // are in play, else the categories.
        let (series_dim, series_values) = if items.len() > 1 {
            (Dimension::DataItem, &items)
        } else {
            (Dimension::DomainCategory, &categories)
        };
        if series_values.len() > 1 {
            for value in series_values {
                let mut filter = base.clone();
                filter.set(series_dim, [value.clone()]);
                legal = intersect(legal, self.year_set(&filter)?);
            }
        }

        let mut years: Vec<String> = legal.unwrap_or_default().into_iter().collect();
        years.sort_by_key(|year| (year.parse::<u32>().ok(), year.clone()));
        Ok(years)
    }

    fn year_set(&self, filter: &Selection) -> EngineResult<BTreeSet<String>> {
        let years = self.store.distinct(Dimension::Year, filter)?;
        Ok(years.into_iter().collect())
    }
}

fn intersect(
    acc: Option<BTreeSet<String>>,
    years: BTreeSet<String>,
) -> Option<BTreeSet<String>> {
    Some(match acc {
        None => years,
        Some(acc) => acc.intersection(&years).cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Fact;

    fn fact(state: &str, year: &str, domain: &str, item: &str, category: &str) -> Fact {
        Fact {
            state_id: state.to_string(),
            year: year.to_string(),
            commodity: "WATER".to_string(),
            data_item: item.to_string(),
            domain: domain.to_string(),
            domain_category: category.to_string(),
            value: 1.0,
        }
    }

    fn seeded() -> FactStore {
        let mut store = FactStore::open_in_memory().unwrap();
        store
            .load(&[
                fact("CA", "2013", "IRRIGATION STATUS", "WATER APPLIED", "IRRIGATED"),
                fact("CA", "2018", "IRRIGATION STATUS", "WATER APPLIED", "IRRIGATED"),
                fact("TX", "2018", "IRRIGATION STATUS", "WATER APPLIED", "IRRIGATED"),
                fact("TX", "2023", "IRRIGATION STATUS", "WATER APPLIED", "IRRIGATED"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_states_need_no_upstream() {
        let store = seeded();
        let resolver = FacetResolver::new(&store);
        let states = resolver
            .legal_values(Dimension::StateId, &Selection::new(), &TieBreaks::new())
            .unwrap();
        assert_eq!(states, ["CA", "TX"]);
    }

    #[test]
    fn test_unset_upstream_yields_empty_not_error() {
        let store = seeded();
        let resolver = FacetResolver::new(&store);
        let commodities = resolver
            .legal_values(Dimension::Commodity, &Selection::new(), &TieBreaks::new())
            .unwrap();
        assert!(commodities.is_empty());
        let years = resolver
            .legal_values(Dimension::Year, &Selection::new(), &TieBreaks::new())
            .unwrap();
        assert!(years.is_empty());
    }

    #[test]
    fn test_years_intersect_across_states() {
        // CA has {2013, 2018}, TX has {2018, 2023}; together only 2018.
        let store = seeded();
        let resolver = FacetResolver::new(&store);
        let sel = Selection::new()
            .with(Dimension::StateId, ["CA", "TX"])
            .with(Dimension::Commodity, ["WATER"])
            .with(Dimension::Domain, ["IRRIGATION STATUS"])
            .with(Dimension::DataItem, ["WATER APPLIED"])
            .with(Dimension::DomainCategory, ["IRRIGATED"]);
        let years = resolver
            .legal_values(Dimension::Year, &sel, &TieBreaks::new())
            .unwrap();
        assert_eq!(years, ["2018"]);
    }

    #[test]
    fn test_years_intersect_per_dimension_not_per_pair() {
        // 2018 is covered by every state (CA under IRRIGATED, TX under
        // NON-IRRIGATED) and by every category, so it is legal even though
        // no single (state, category) pair covers both.
        let mut store = FactStore::open_in_memory().unwrap();
        store
            .load(&[
                fact("CA", "2018", "IRRIGATION STATUS", "WATER APPLIED", "IRRIGATED"),
                fact("TX", "2018", "IRRIGATION STATUS", "WATER APPLIED", "NON-IRRIGATED"),
            ])
            .unwrap();
        let resolver = FacetResolver::new(&store);
        let sel = Selection::new()
            .with(Dimension::StateId, ["CA", "TX"])
            .with(Dimension::Commodity, ["WATER"])
            .with(Dimension::Domain, ["IRRIGATION STATUS"])
            .with(Dimension::DataItem, ["WATER APPLIED"])
            .with(Dimension::DomainCategory, ["IRRIGATED", "NON-IRRIGATED"]);
        let years = resolver
            .legal_values(Dimension::Year, &sel, &TieBreaks::new())
            .unwrap();
        assert_eq!(years, ["2018"]);
    }

    #[test]
    fn test_downstream_choice_does_not_narrow_upstream_facet() {
        let store = seeded();
        let resolver = FacetResolver::new(&store);
        let sel = Selection::new()
            .with(Dimension::StateId, ["CA"])
            .with(Dimension::Year, ["2013"]);
        let commodities = resolver
            .legal_values(Dimension::Commodity, &sel, &TieBreaks::new())
            .unwrap();
        assert_eq!(commodities, ["WATER"]);
    }
}
