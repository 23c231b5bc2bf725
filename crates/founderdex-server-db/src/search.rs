// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Multi-term founder search over a [`FounderStore`].
//!
//! Every term is looked up in the profile, education and experience tables
//! concurrently, and all terms run concurrently. The per-term id sets are
//! intersected before a single paginated listing query.

use std::collections::HashSet;
use std::sync::Arc;

use founderdex_search_core::{
	intersect_candidates, parse_terms, FounderFilter, FounderId, FounderProfile, PageRequest,
	SearchPage, SearchTerm,
};
use futures::future::try_join_all;

use crate::error::DbError;
use crate::founder::FounderStore;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
	#[error("candidate lookup failed: {0}")]
	Candidates(#[source] DbError),

	#[error("founder listing failed: {0}")]
	Listing(#[source] DbError),
}

/// A page of founders plus the terms that selected them.
#[derive(Debug, Clone)]
pub struct FounderSearchResult {
	pub terms: Vec<SearchTerm>,
	pub page: SearchPage<FounderProfile>,
}

#[derive(Clone)]
pub struct FounderSearchService {
	store: Arc<dyn FounderStore>,
}

impl FounderSearchService {
	pub fn new(store: Arc<dyn FounderStore>) -> Self {
		Self { store }
	}

	#[tracing::instrument(skip(self, page), fields(page = page.page(), page_size = page.page_size()))]
	pub async fn search(
		&self,
		query: &str,
		page: PageRequest,
	) -> Result<FounderSearchResult, SearchError> {
		let terms = parse_terms(query);

		let filter = if terms.is_empty() {
			FounderFilter::All
		} else {
			let per_term = try_join_all(terms.iter().map(|term| self.ids_for_term(term)))
				.await
				.map_err(SearchError::Candidates)?;
			match FounderFilter::from_candidates(intersect_candidates(per_term)) {
				Some(filter) => filter,
				None => {
					tracing::debug!(terms = terms.len(), "no founder matches every term");
					return Ok(FounderSearchResult {
						terms,
						page: SearchPage::empty(),
					});
				}
			}
		};

		let (offset, limit) = page.window();
		let (items, total_count) = self
			.store
			.list_founders(&filter, offset, limit)
			.await
			.map_err(SearchError::Listing)?;

		tracing::debug!(
			terms = terms.len(),
			returned = items.len(),
			total_count,
			"founder search completed"
		);

		Ok(FounderSearchResult {
			terms,
			page: SearchPage { items, total_count },
		})
	}

	async fn ids_for_term(&self, term: &SearchTerm) -> Result<HashSet<FounderId>, DbError> {
		let (mut ids, education, experience) = tokio::try_join!(
			self.store.ids_matching_profile(term),
			self.store.ids_matching_education(term),
			self.store.ids_matching_experience(term),
		)?;
		ids.extend(education);
		ids.extend(experience);
		Ok(ids)
	}
}
