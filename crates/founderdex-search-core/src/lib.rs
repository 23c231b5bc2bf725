// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and pure logic for founder search.
//!
//! A query such as `Stanford+MBA` is split into AND-combined terms
//! ([`parse_terms`]). Storage returns one set of matching founder ids per
//! term, which [`intersect_candidates`] combines. [`PageRequest`] turns a
//! 1-indexed page into an offset window, and [`find_matches`] plus
//! [`display_plan`] describe which education and experience entries to
//! highlight on each result.

pub mod candidates;
pub mod highlight;
pub mod page;
pub mod terms;
pub mod types;

pub use candidates::{intersect_candidates, FounderFilter};
pub use highlight::{
	display_plan, find_matches, DisplayEntry, DisplayPlan, FounderHighlights, MatchField, MatchKind,
	SearchMatch,
};
pub use page::{PageRequest, SearchPage, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use terms::{escape_like, fold_case, parse_terms, SearchTerm, LIKE_ESCAPE};
pub use types::{
	EducationId, EducationRecord, ExperienceId, ExperienceRecord, FounderId, FounderProfile,
};
