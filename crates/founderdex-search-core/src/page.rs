// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Offset pagination for founder listings.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// A 1-indexed page of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
	page: u32,
	page_size: u32,
}

impl Default for PageRequest {
	fn default() -> Self {
		Self {
			page: 1,
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}

impl PageRequest {
	/// Page numbers below 1 become 1; page sizes are clamped to `1..=max_page_size`.
	pub fn new(page: i64, page_size: i64, max_page_size: u32) -> Self {
		let max = i64::from(max_page_size.max(1));
		Self {
			page: page.clamp(1, i64::from(u32::MAX)) as u32,
			page_size: page_size.clamp(1, max) as u32,
		}
	}

	/// Build from raw query-string values. Missing or non-numeric values fall
	/// back to page 1 and `default_page_size`.
	pub fn from_query(
		page: Option<&str>,
		page_size: Option<&str>,
		default_page_size: u32,
		max_page_size: u32,
	) -> Self {
		let page = page
			.and_then(|p| p.trim().parse::<i64>().ok())
			.unwrap_or(1);
		let page_size = page_size
			.and_then(|p| p.trim().parse::<i64>().ok())
			.unwrap_or(i64::from(default_page_size));
		Self::new(page, page_size, max_page_size)
	}

	pub fn page(&self) -> u32 {
		self.page
	}

	pub fn page_size(&self) -> u32 {
		self.page_size
	}

	/// `(offset, limit)` for a SQL `LIMIT ? OFFSET ?` clause.
	pub fn window(&self) -> (i64, i64) {
		let offset = (i64::from(self.page) - 1) * i64::from(self.page_size);
		(offset, i64::from(self.page_size))
	}
}

/// One page of results plus the exact size of the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage<T> {
	pub items: Vec<T>,
	pub total_count: i64,
}

impl<T> SearchPage<T> {
	pub fn empty() -> Self {
		Self {
			items: Vec::new(),
			total_count: 0,
		}
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn prop_pages_tile_the_result_set(total in 0i64..500, size in 1i64..50) {
			let pages = (total + size - 1) / size;
			let mut covered = Vec::new();
			for p in 1..=pages {
				let (offset, limit) = PageRequest::new(p, size, 100).window();
				let end = (offset + limit).min(total);
				covered.extend(offset..end);
			}
			let expected: Vec<i64> = (0..total).collect();
			prop_assert_eq!(covered, expected);
		}
	}
}
