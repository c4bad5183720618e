//! The TOTAL-domain adapter.
//!
//! Under `domain = TOTAL` facts are not split into domain categories (every
//! row carries the sentinel category), so the comparison axis becomes other
//! data items measured in the same unit. The unit is the suffix after the
//! last `" - "` of the chosen item's name, e.g. `"TOTAL, IRRIGATION -
//! ACRES"` compares against other `"... - ACRES"` items.

use crate::error::EngineResult;
use crate::selection::{CompareMode, Dimension, Selection, TieBreaks};
use crate::store::FactStore;

/// The domain value that switches the category facet to comparable items.
pub const TOTAL_DOMAIN: &str = "TOTAL";

/// Whether the selection's chosen domain is the TOTAL domain.
pub fn is_total_domain(selection: &Selection) -> bool {
    selection.first(Dimension::Domain) == Some(TOTAL_DOMAIN)
}

/// The unit suffix of a data item name: everything after the last `" - "`,
/// or the whole name when there is no separator.
pub fn unit_of(data_item: &str) -> &str {
    match data_item.rsplit_once(" - ") {
        Some((_, unit)) => unit,
        None => data_item,
    }
}

/// Data items comparable to the chosen one: same states and commodity,
/// `domain = TOTAL`, same unit suffix, the chosen item(s) excluded.
///
/// Empty until states, commodity, the TOTAL domain, and a data item are all
/// chosen.
pub fn comparable_items(store: &FactStore, selection: &Selection) -> EngineResult<Vec<String>> {
    if !is_total_domain(selection)
        || !selection.is_set(Dimension::StateId)
        || !selection.is_set(Dimension::Commodity)
        || !selection.is_set(Dimension::DataItem)
    {
        return Ok(Vec::new());
    }
    let chosen = selection.values(Dimension::DataItem);
    // is_set above guarantees a first item
    let unit = chosen.first().map(String::as_str).map(unit_of).unwrap_or("");
    let filter = selection.restricted_to(&[
        Dimension::StateId,
        Dimension::Commodity,
        Dimension::Domain,
    ]);
    let items = store.comparable_items(&filter, chosen, unit)?;
    Ok(items)
}

/// The data items the final query filters by: the chosen item(s), plus the
/// retained comparable items when comparing multiple under TOTAL.
pub fn effective_data_items(selection: &Selection, ties: &TieBreaks) -> Vec<String> {
    let mut items: Vec<String> = selection.values(Dimension::DataItem).to_vec();
    if is_total_domain(selection) && ties.compare_mode == Some(CompareMode::Multiple) {
        for item in selection.values(Dimension::ComparableDataItem) {
            if !items.contains(item) {
                items.push(item.clone());
            }
        }
    }
    items
}
