// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading founders from a JSON export.
//!
//! The file holds an array of founders, each with its profile fields and
//! nested `founder_education` and `founder_experience` arrays.

use std::path::Path;

use anyhow::Context;
use founderdex_server_db::{FounderStore, NewFounder};

/// Insert every founder in `path`. Returns how many were inserted.
pub async fn seed_founders(store: &dyn FounderStore, path: &Path) -> anyhow::Result<usize> {
	let raw = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("failed to read {}", path.display()))?;
	let founders: Vec<NewFounder> = serde_json::from_str(&raw)
		.with_context(|| format!("{} is not a JSON array of founders", path.display()))?;

	let total = founders.len();
	for (index, founder) in founders.into_iter().enumerate() {
		let name = founder.founder_name.clone();
		store
			.insert_founder(founder)
			.await
			.with_context(|| format!("failed to insert founder #{index} ({name})"))?;
	}

	tracing::info!(count = total, path = %path.display(), "founders seeded");
	Ok(total)
}
