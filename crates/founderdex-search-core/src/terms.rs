// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query term parsing.

/// Escape character used in `LIKE ... ESCAPE` clauses built from [`escape_like`].
pub const LIKE_ESCAPE: char = '\\';

/// One AND-combined search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
	raw: String,
	lowered: String,
}

impl SearchTerm {
	pub fn new(raw: impl Into<String>) -> Self {
		let raw = raw.into();
		let lowered = fold_case(&raw);
		Self { raw, lowered }
	}

	/// The term as typed, trimmed.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Lowercased form used for case-insensitive comparisons.
	pub fn lowered(&self) -> &str {
		&self.lowered
	}

	/// `%term%` over the lowercased term, with LIKE wildcards escaped.
	///
	/// Match it against columns lowercased with [`fold_case`]; SQLite's own
	/// `LIKE` only folds ASCII.
	pub fn like_pattern(&self) -> String {
		format!("%{}%", escape_like(&self.lowered))
	}

	/// Case-insensitive substring test.
	pub fn matches(&self, haystack: &str) -> bool {
		fold_case(haystack).contains(&self.lowered)
	}
}

/// Case folding shared by [`SearchTerm`] and stored search columns.
pub fn fold_case(value: &str) -> String {
	value.to_lowercase()
}

/// Split a raw query on `+`, trimming each piece and dropping empty ones.
///
/// An empty result means "no filter".
pub fn parse_terms(raw: &str) -> Vec<SearchTerm> {
	raw.split('+')
		.map(str::trim)
		.filter(|t| !t.is_empty())
		.map(SearchTerm::new)
		.collect()
}

/// Escape `%`, `_` and the escape character itself so the term matches literally.
pub fn escape_like(term: &str) -> String {
	let mut out = String::with_capacity(term.len());
	for c in term.chars() {
		if c == '%' || c == '_' || c == LIKE_ESCAPE {
			out.push(LIKE_ESCAPE);
		}
		out.push(c);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(terms: &[SearchTerm]) -> Vec<&str> {
		terms.iter().map(SearchTerm::as_str).collect()
	}

	#[test]
	fn test_parse_single_term() {
		assert_eq!(raw(&parse_terms("Stanford")), vec!["Stanford"]);
	}

	#[test]
	fn test_parse_multiple_terms_trimmed() {
		assert_eq!(
			raw(&parse_terms(" Stanford + MBA +Apple")),
			vec!["Stanford", "MBA", "Apple"]
		);
	}

	#[test]
	fn test_parse_drops_empty_terms() {
		assert_eq!(raw(&parse_terms("++Stanford+  +")), vec!["Stanford"]);
	}

	#[test]
	fn test_parse_empty_query() {
		assert!(parse_terms("").is_empty());
		assert!(parse_terms("   ").is_empty());
		assert!(parse_terms("+++").is_empty());
	}

	#[test]
	fn test_inner_whitespace_is_kept() {
		assert_eq!(raw(&parse_terms("Goldman Sachs")), vec!["Goldman Sachs"]);
	}

	#[test]
	fn test_lowered() {
		let term = SearchTerm::new("StanFord");
		assert_eq!(term.lowered(), "stanford");
	}

	#[test]
	fn test_matches_case_insensitive_substring() {
		let term = SearchTerm::new("stan");
		assert!(term.matches("Stanford University"));
		assert!(term.matches("STANDARD"));
		assert!(!term.matches("Harvard"));
	}

	#[test]
	fn test_escape_like() {
		assert_eq!(escape_like("100%"), "100\\%");
		assert_eq!(escape_like("a_b"), "a\\_b");
		assert_eq!(escape_like("c\\d"), "c\\\\d");
		assert_eq!(escape_like("plain"), "plain");
	}

	#[test]
	fn test_like_pattern() {
		assert_eq!(SearchTerm::new("50%").like_pattern(), "%50\\%%");
		assert_eq!(SearchTerm::new("ÉCOLE").like_pattern(), "%école%");
	}
}
