// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-result match annotations.
//!
//! After a founder is selected, every term is checked again against the
//! founder's education and experience entries so the card can show which
//! entries matched. Matched entries are listed first and get a larger display
//! cap.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{FounderProfile, SearchTerm};

/// Entries shown when at least one entry of that kind matched.
pub const MATCHED_DISPLAY_CAP: usize = 3;
/// Entries shown otherwise.
pub const DEFAULT_DISPLAY_CAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
	Education,
	Experience,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
	School,
	Degree,
	Company,
	Title,
}

/// A child entry field that contains one of the search terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchMatch {
	#[serde(rename = "type")]
	pub kind: MatchKind,
	/// Position of the entry in the founder's list.
	pub index: usize,
	pub field: MatchField,
	/// The field value as stored.
	pub value: String,
}

/// Collect every (entry, field) that contains any term, case-insensitively.
///
/// School and company are always checked; degree and title only when present
/// and non-empty. Output is grouped by term, then education before experience,
/// then by entry position.
pub fn find_matches(founder: &FounderProfile, terms: &[SearchTerm]) -> Vec<SearchMatch> {
	let mut matches = Vec::new();

	for term in terms {
		for (index, edu) in founder.founder_education.iter().enumerate() {
			if term.matches(&edu.school) {
				matches.push(SearchMatch {
					kind: MatchKind::Education,
					index,
					field: MatchField::School,
					value: edu.school.clone(),
				});
			}
			if let Some(degree) = edu.degree.as_deref().filter(|d| !d.is_empty()) {
				if term.matches(degree) {
					matches.push(SearchMatch {
						kind: MatchKind::Education,
						index,
						field: MatchField::Degree,
						value: degree.to_string(),
					});
				}
			}
		}

		for (index, exp) in founder.founder_experience.iter().enumerate() {
			if term.matches(&exp.company) {
				matches.push(SearchMatch {
					kind: MatchKind::Experience,
					index,
					field: MatchField::Company,
					value: exp.company.clone(),
				});
			}
			if let Some(title) = exp.title.as_deref().filter(|t| !t.is_empty()) {
				if term.matches(title) {
					matches.push(SearchMatch {
						kind: MatchKind::Experience,
						index,
						field: MatchField::Title,
						value: title.to_string(),
					});
				}
			}
		}
	}

	matches
}

/// One entry to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DisplayEntry {
	pub index: usize,
	pub matched: bool,
}

/// Which entries of one kind to show, in order, and how many are hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DisplayPlan {
	pub entries: Vec<DisplayEntry>,
	/// Rendered as "+N more".
	pub hidden_count: usize,
}

/// Order `len` entries of `kind` with matched ones first (ties by position)
/// and cap them at [`MATCHED_DISPLAY_CAP`] or [`DEFAULT_DISPLAY_CAP`].
pub fn display_plan(len: usize, matches: &[SearchMatch], kind: MatchKind) -> DisplayPlan {
	let matched: HashSet<usize> = matches
		.iter()
		.filter(|m| m.kind == kind && m.index < len)
		.map(|m| m.index)
		.collect();

	let cap = if matched.is_empty() {
		DEFAULT_DISPLAY_CAP
	} else {
		MATCHED_DISPLAY_CAP
	};

	let mut order: Vec<usize> = (0..len).collect();
	order.sort_by_key(|i| (!matched.contains(i), *i));

	let entries = order
		.into_iter()
		.take(cap)
		.map(|index| DisplayEntry {
			index,
			matched: matched.contains(&index),
		})
		.collect();

	DisplayPlan {
		entries,
		hidden_count: len.saturating_sub(cap),
	}
}

/// Display plans for both child lists of a founder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FounderHighlights {
	pub education: DisplayPlan,
	pub experience: DisplayPlan,
}

impl FounderHighlights {
	pub fn for_founder(founder: &FounderProfile, matches: &[SearchMatch]) -> Self {
		Self {
			education: display_plan(
				founder.founder_education.len(),
				matches,
				MatchKind::Education,
			),
			experience: display_plan(
				founder.founder_experience.len(),
				matches,
				MatchKind::Experience,
			),
		}
	}
}
