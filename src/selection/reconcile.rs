//! Reconciling a previous multi-select against a freshly resolved legal set.
//!
//! When an upstream choice changes, values picked earlier may no longer be
//! legal. `reconcile` keeps the still-legal ones (in their original order)
//! and, once the retained count reaches the dimension's quota, marks every
//! unchosen candidate disabled so the caller can grey it out.

/// The outcome of reconciling a multi-select dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Previously chosen values that are still legal, in choice order.
    pub retained: Vec<String>,
    /// Candidates that may not be newly chosen because the quota is full.
    /// Empty while the quota has headroom.
    pub disabled: Vec<String>,
}

/// Intersect a previous selection with the current candidate set and apply
/// the quota.
///
/// `retained` is `previous ∩ candidates` with `previous`'s order; `disabled`
/// is `candidates \ retained` when `retained.len() >= quota`, otherwise
/// empty. Already-retained values are never disabled, so a full quota can
/// still be unwound by deselecting.
pub fn reconcile(candidates: &[String], previous: &[String], quota: usize) -> Reconciled {
    let retained: Vec<String> = previous
        .iter()
        .filter(|value| candidates.contains(value))
        .cloned()
        .collect();

    let disabled = if retained.len() >= quota {
        candidates
            .iter()
            .filter(|value| !retained.contains(value))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    Reconciled { retained, disabled }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_retained_is_intersection_in_previous_order() {
        let candidates = strings(&["AZ", "CA", "NE", "TX"]);
        let previous = strings(&["TX", "CA", "OR"]);
        let out = reconcile(&candidates, &previous, 5);
        assert_eq!(out.retained, strings(&["TX", "CA"]));
        assert!(out.disabled.is_empty());
    }

    #[test]
    fn test_quota_reached_disables_unchosen_candidates() {
        let candidates = strings(&["A", "B", "C", "D"]);
        let previous = strings(&["A", "B"]);
        let out = reconcile(&candidates, &previous, 2);
        assert_eq!(out.retained, strings(&["A", "B"]));
        assert_eq!(out.disabled, strings(&["C", "D"]));
    }

    #[test]
    fn test_quota_never_drops_retained_values() {
        // More previous values than the quota: all still-legal ones stay.
        let candidates = strings(&["A", "B", "C"]);
        let previous = strings(&["A", "B", "C"]);
        let out = reconcile(&candidates, &previous, 2);
        assert_eq!(out.retained, strings(&["A", "B", "C"]));
        assert!(out.disabled.is_empty());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let candidates = strings(&["A", "B", "C", "D"]);
        let previous = strings(&["D", "A", "E"]);
        let once = reconcile(&candidates, &previous, 2);
        let twice = reconcile(&candidates, &once.retained, 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_candidates_clears_everything() {
        let out = reconcile(&[], &strings(&["A", "B"]), 5);
        assert!(out.retained.is_empty());
        assert!(out.disabled.is_empty());
    }
}
