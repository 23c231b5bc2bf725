// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Founder search configuration.

use founderdex_search_core::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use serde::Deserialize;

/// Search configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct SearchConfig {
	pub default_page_size: u32,
	pub max_page_size: u32,
	/// Reject listing requests without a same-site `Referer`.
	pub block_direct_access: bool,
}

impl Default for SearchConfig {
	fn default() -> Self {
		SearchConfigLayer::default().finalize()
	}
}

/// Search configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfigLayer {
	#[serde(default)]
	pub default_page_size: Option<u32>,
	#[serde(default)]
	pub max_page_size: Option<u32>,
	#[serde(default)]
	pub block_direct_access: Option<bool>,
}

impl SearchConfigLayer {
	pub fn merge(&mut self, other: SearchConfigLayer) {
		if other.default_page_size.is_some() {
			self.default_page_size = other.default_page_size;
		}
		if other.max_page_size.is_some() {
			self.max_page_size = other.max_page_size;
		}
		if other.block_direct_access.is_some() {
			self.block_direct_access = other.block_direct_access;
		}
	}

	pub fn finalize(self) -> SearchConfig {
		let max_page_size = self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE).max(1);
		SearchConfig {
			default_page_size: self
				.default_page_size
				.unwrap_or(DEFAULT_PAGE_SIZE)
				.clamp(1, max_page_size),
			max_page_size,
			block_direct_access: self.block_direct_access.unwrap_or(true),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = SearchConfig::default();
		assert_eq!(config.default_page_size, 24);
		assert_eq!(config.max_page_size, 100);
		assert!(config.block_direct_access);
	}

	#[test]
	fn test_default_page_size_capped_by_max() {
		let config = SearchConfigLayer {
			default_page_size: Some(50),
			max_page_size: Some(10),
			block_direct_access: Some(false),
		}
		.finalize();
		assert_eq!(config.default_page_size, 10);
		assert!(!config.block_direct_access);
	}
}
