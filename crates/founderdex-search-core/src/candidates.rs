// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Combining per-term matches.

use std::collections::{BTreeSet, HashSet};

use crate::FounderId;

/// Which founders the final listing query may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FounderFilter {
	/// No search terms: every founder.
	All,
	/// Only these founders. Never empty; an empty intersection short-circuits
	/// before a listing is requested.
	Ids(BTreeSet<FounderId>),
}

impl FounderFilter {
	pub fn from_candidates(ids: HashSet<FounderId>) -> Option<Self> {
		if ids.is_empty() {
			None
		} else {
			Some(Self::Ids(ids.into_iter().collect()))
		}
	}
}

/// Intersect the id sets of every term (AND).
///
/// Returns an empty set when there are no sets or any set is empty. The
/// result does not depend on the order of `per_term`.
pub fn intersect_candidates(per_term: Vec<HashSet<FounderId>>) -> HashSet<FounderId> {
	let mut sets = per_term;
	if sets.iter().any(|s| s.is_empty()) {
		return HashSet::new();
	}
	// Smallest set first.
	sets.sort_by_key(|s| s.len());
	let mut iter = sets.into_iter();
	let Some(mut acc) = iter.next() else {
		return HashSet::new();
	};
	for set in iter {
		acc.retain(|id| set.contains(id));
		if acc.is_empty() {
			break;
		}
	}
	acc
}
