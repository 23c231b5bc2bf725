// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session cookie handling.
//!
//! The cookie carries the identity provider's access token. Each request
//! resolves it back to an [`Identity`] through the provider.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use founderdex_server_auth_supabase::{Identity, IdentityProvider};
use founderdex_server_config::AuthConfig;

/// Suffix of the cookie holding the PKCE code verifier.
pub const CODE_VERIFIER_SUFFIX: &str = "-code-verifier";

/// Read a cookie value by name from request headers.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let (cookie_name, value) = cookie.trim().split_once('=')?;
			(cookie_name == name && !value.is_empty()).then(|| value.to_string())
		})
}

pub fn session_token(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
	extract_cookie(headers, &config.session_cookie_name)
}

pub fn code_verifier(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
	extract_cookie(
		headers,
		&format!("{}{CODE_VERIFIER_SUFFIX}", config.session_cookie_name),
	)
}

fn cookie_attributes(config: &AuthConfig) -> &'static str {
	if config.secure_cookies {
		"; Path=/; HttpOnly; SameSite=Lax; Secure"
	} else {
		"; Path=/; HttpOnly; SameSite=Lax"
	}
}

/// `Set-Cookie` value storing `access_token`.
pub fn session_cookie(
	config: &AuthConfig,
	access_token: &str,
	max_age_secs: Option<u64>,
) -> Option<HeaderValue> {
	let mut cookie = format!(
		"{}={access_token}{}",
		config.session_cookie_name,
		cookie_attributes(config)
	);
	if let Some(max_age) = max_age_secs {
		cookie.push_str(&format!("; Max-Age={max_age}"));
	}
	HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value expiring cookie `name`.
pub fn expired_cookie(config: &AuthConfig, name: &str) -> Option<HeaderValue> {
	HeaderValue::from_str(&format!("{name}={}; Max-Age=0", cookie_attributes(config))).ok()
}

/// Resolve the signed-in user from the session cookie.
///
/// Provider errors count as signed out.
pub async fn current_identity(
	headers: &HeaderMap,
	config: &AuthConfig,
	identity: Option<&dyn IdentityProvider>,
) -> Option<Identity> {
	let provider = identity?;
	let token = session_token(headers, config)?;
	match provider.get_user(&token).await {
		Ok(user) => user,
		Err(e) => {
			tracing::warn!(error = %e, "failed to resolve session");
			None
		}
	}
}
