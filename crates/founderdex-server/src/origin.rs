// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Same-site guard for the founders listing.
//!
//! The listing is meant to be fetched by the site's own pages. Requests from
//! foreign origins are refused, and with `search.block_direct_access` so are
//! requests that arrive without a referring page.

use axum::http::{
	header::{ORIGIN, REFERER},
	HeaderMap,
};
use founderdex_server_config::{HttpConfig, SearchConfig};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginRejection {
	/// Cross-origin request from a site that is not allowed.
	AccessDenied,
	/// No referring page, or the endpoint referring to itself.
	DirectAccess,
}

impl OriginRejection {
	pub fn message(&self) -> &'static str {
		match self {
			OriginRejection::AccessDenied => "Access denied",
			OriginRejection::DirectAccess => "Direct access not allowed",
		}
	}
}

fn header<'a>(headers: &'a HeaderMap, name: axum::http::HeaderName) -> Option<&'a str> {
	headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
}

/// Serialized origin of a URL, e.g. `https://founderdex.com`.
fn origin_of(url: &Url) -> String {
	url.origin().ascii_serialization()
}

/// Check a request to `path` against the allowed origins.
pub fn check_origin(
	headers: &HeaderMap,
	path: &str,
	http: &HttpConfig,
	search: &SearchConfig,
) -> Result<(), OriginRejection> {
	let origin = header(headers, ORIGIN);
	let referer = header(headers, REFERER).and_then(|r| Url::parse(r).ok());

	// Same-origin fetches omit the Origin header.
	let origin_allowed = origin.map_or(true, |o| http.is_allowed_origin(o));
	let referer_allowed = referer
		.as_ref()
		.is_some_and(|r| http.is_allowed_origin(&origin_of(r)));

	if !origin_allowed && !referer_allowed {
		return Err(OriginRejection::AccessDenied);
	}

	if search.block_direct_access {
		let direct = match &referer {
			None => true,
			Some(r) => r.path().trim_end_matches('/') == path.trim_end_matches('/'),
		};
		if direct {
			return Err(OriginRejection::DirectAccess);
		}
	}

	Ok(())
}
