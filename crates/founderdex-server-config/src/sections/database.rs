// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite location and pool sizing.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_URL: &str = "sqlite:./founderdex.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	/// Upper bound on pooled connections; at least 1.
	pub max_connections: u32,
	/// How long a writer waits on a locked database before failing.
	pub busy_timeout_secs: u64,
}

impl DatabaseConfig {
	pub fn busy_timeout(&self) -> Duration {
		Duration::from_secs(self.busy_timeout_secs)
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub max_connections: Option<u32>,
	#[serde(default)]
	pub busy_timeout_secs: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.max_connections.is_some() {
			self.max_connections = other.max_connections;
		}
		if other.busy_timeout_secs.is_some() {
			self.busy_timeout_secs = other.busy_timeout_secs;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
			max_connections: self
				.max_connections
				.unwrap_or(DEFAULT_MAX_CONNECTIONS)
				.max(1),
			busy_timeout_secs: self.busy_timeout_secs.unwrap_or(DEFAULT_BUSY_TIMEOUT_SECS),
		}
	}
}
