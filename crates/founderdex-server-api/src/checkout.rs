// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// Body of `POST /checkout`. Every field is optional on the wire so a
/// missing one can be reported by name instead of as a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
	#[serde(default)]
	pub price_id: Option<String>,
	/// `payment` or `subscription`.
	#[serde(default)]
	pub mode: Option<String>,
	#[serde(default)]
	pub success_url: Option<String>,
	#[serde(default)]
	pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CheckoutResponse {
	pub url: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_camel_case_fields() {
		let request: CheckoutRequest = serde_json::from_str(
			r#"{"priceId":"price_1","mode":"payment","successUrl":"https://a/ok","cancelUrl":"https://a/no"}"#,
		)
		.unwrap();
		assert_eq!(request.price_id.as_deref(), Some("price_1"));
		assert_eq!(request.cancel_url.as_deref(), Some("https://a/no"));
	}

	#[test]
	fn test_missing_fields_deserialize() {
		let request: CheckoutRequest = serde_json::from_str(r#"{"mode":"payment"}"#).unwrap();
		assert_eq!(request.price_id, None);
		assert_eq!(request.success_url, None);
	}
}
