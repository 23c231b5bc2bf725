// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use founderdex_search_core::{
	find_matches, FounderHighlights, FounderProfile, SearchMatch, SearchTerm,
};
use serde::{Deserialize, Serialize};

/// Query string of `GET /founders`. Paging values are kept as text and
/// parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct FoundersQuery {
	/// Terms separated by `+`, all of which must match.
	#[serde(default)]
	pub search: Option<String>,
	/// 1-indexed page number.
	#[serde(default)]
	pub page: Option<String>,
	#[serde(default)]
	pub page_size: Option<String>,
}

/// A founder plus the child entries that matched the search terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FounderResult {
	#[serde(flatten)]
	pub founder: FounderProfile,
	pub search_matches: Vec<SearchMatch>,
	pub highlights: FounderHighlights,
}

impl FounderResult {
	pub fn new(founder: FounderProfile, terms: &[SearchTerm]) -> Self {
		let search_matches = find_matches(&founder, terms);
		let highlights = FounderHighlights::for_founder(&founder, &search_matches);
		Self {
			founder,
			search_matches,
			highlights,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FoundersResponse {
	pub founders: Vec<FounderResult>,
	pub total_count: i64,
	/// Set only when the search failed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Message shown to visitors when a search fails.
pub const FOUNDERS_LOAD_FAILED: &str = "Failed to load founders.";

impl FoundersResponse {
	pub fn empty() -> Self {
		Self {
			founders: Vec::new(),
			total_count: 0,
			error: None,
		}
	}

	/// Empty page carrying [`FOUNDERS_LOAD_FAILED`].
	pub fn failed() -> Self {
		Self {
			error: Some(FOUNDERS_LOAD_FAILED.to_string()),
			..Self::empty()
		}
	}
}
