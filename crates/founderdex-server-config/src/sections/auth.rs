// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provider and session cookie configuration.

use founderdex_common_secret::SecretString;
use serde::Deserialize;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "founderdex_session";

/// Auth configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Deployment environment, e.g. "development" or "production".
	pub environment: String,
	pub supabase_url: Option<String>,
	pub supabase_anon_key: Option<SecretString>,
	/// Needed to create users for payments that arrive without a signed-in user.
	pub supabase_service_role_key: Option<SecretString>,
	pub session_cookie_name: String,
	pub secure_cookies: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}

	/// Sign-in works once the project URL and anon key are set.
	pub fn is_configured(&self) -> bool {
		self.supabase_url.is_some() && self.supabase_anon_key.is_some()
	}

	pub fn has_admin_access(&self) -> bool {
		self.is_configured() && self.supabase_service_role_key.is_some()
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub supabase_url: Option<String>,
	#[serde(default)]
	pub supabase_anon_key: Option<SecretString>,
	#[serde(default)]
	pub supabase_service_role_key: Option<SecretString>,
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	#[serde(default)]
	pub secure_cookies: Option<bool>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.supabase_url.is_some() {
			self.supabase_url = other.supabase_url;
		}
		if other.supabase_anon_key.is_some() {
			self.supabase_anon_key = other.supabase_anon_key;
		}
		if other.supabase_service_role_key.is_some() {
			self.supabase_service_role_key = other.supabase_service_role_key;
		}
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.secure_cookies.is_some() {
			self.secure_cookies = other.secure_cookies;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			environment: self
				.environment
				.unwrap_or_else(|| "development".to_string()),
			supabase_url: self
				.supabase_url
				.map(|u| u.trim_end_matches('/').to_string()),
			supabase_anon_key: self.supabase_anon_key,
			supabase_service_role_key: self.supabase_service_role_key,
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
			secure_cookies: self.secure_cookies.unwrap_or(true),
		}
	}
}
