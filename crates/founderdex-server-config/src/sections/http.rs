// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener and public origin configuration.

use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Origins of the local web frontend in development.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://localhost:3000"];

/// HTTP configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Public URL of the site. Redirects after sign-in are built from it.
	pub base_url: String,
	/// Origins allowed to call the founders listing. Always contains
	/// `base_url` and the local development origins.
	pub allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

impl HttpConfig {
	pub fn is_allowed_origin(&self, origin: &str) -> bool {
		let origin = origin.trim_end_matches('/');
		self.allowed_origins
			.iter()
			.any(|o| o.trim_end_matches('/') == origin)
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub allowed_origins: Option<Vec<String>>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.allowed_origins.is_some() {
			self.allowed_origins = other.allowed_origins;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		let base_url = self
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
			.trim_end_matches('/')
			.to_string();

		let mut allowed_origins: Vec<String> = DEV_ORIGINS.iter().map(|s| s.to_string()).collect();
		allowed_origins.push(base_url.clone());
		for origin in self.allowed_origins.unwrap_or_default() {
			let origin = origin.trim().trim_end_matches('/').to_string();
			if !origin.is_empty() && !allowed_origins.contains(&origin) {
				allowed_origins.push(origin);
			}
		}

		HttpConfig {
			host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
			port: self.port.unwrap_or(DEFAULT_PORT),
			base_url,
			allowed_origins,
		}
	}
}
