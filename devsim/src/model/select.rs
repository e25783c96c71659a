//! Tie-breaking helpers for coupled models.
//!
//! A select function receives the handles of the imminent children of a
//! coupled model, in insertion order, and returns the one that fires first.
//! The helpers below can be used directly from a closure passed to
//! [`CoupledModel::set_select`](super::CoupledModel::set_select).

use super::ModelHandle;

/// Returns the candidate that comes first in `order`.
///
/// Candidates missing from `order` are never selected, so `None` is returned
/// if none of the candidates is listed.
pub fn priority(order: &[ModelHandle], candidates: &[ModelHandle]) -> Option<ModelHandle> {
    order
        .iter()
        .find(|handle| candidates.contains(handle))
        .copied()
}

/// Returns the first candidate in insertion order.
pub fn first(candidates: &[ModelHandle]) -> Option<ModelHandle> {
    candidates.first().copied()
}
