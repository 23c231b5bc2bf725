// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supabase Auth request and response types.

use founderdex_common_secret::SecretString;
use serde::{Deserialize, Serialize};

/// A user known to the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	pub id: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub created_at: Option<String>,
	#[serde(default)]
	pub user_metadata: serde_json::Value,
}

/// Tokens returned by a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
	pub access_token: SecretString,
	#[serde(default)]
	pub refresh_token: Option<SecretString>,
	/// Lifetime of `access_token` in seconds.
	#[serde(default)]
	pub expires_in: Option<u64>,
	#[serde(default)]
	pub token_type: Option<String>,
	pub user: Identity,
}

#[derive(Debug, Serialize)]
pub(crate) struct PkceExchangeRequest<'a> {
	pub auth_code: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code_verifier: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminCreateUserRequest<'a> {
	pub email: &'a str,
	pub email_confirm: bool,
}

/// Error body shapes Supabase uses across endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub error_description: Option<String>,
	#[serde(default)]
	pub msg: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
}

impl ErrorBody {
	pub fn parse(body: &str) -> String {
		let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
		parsed
			.error_description
			.or(parsed.msg)
			.or(parsed.message)
			.or(parsed.error)
			.unwrap_or_else(|| body.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_session_deserializes() {
		let session: Session = serde_json::from_str(
			r#"{
				"access_token": "at_123",
				"refresh_token": "rt_456",
				"expires_in": 3600,
				"token_type": "bearer",
				"user": {"id": "u-1", "email": "ada@example.com"}
			}"#,
		)
		.unwrap();
		assert_eq!(session.access_token.expose(), "at_123");
		assert_eq!(session.user.id, "u-1");
		assert_eq!(session.expires_in, Some(3600));
	}

	#[test]
	fn test_session_debug_hides_tokens() {
		let session: Session = serde_json::from_str(
			r#"{"access_token": "at_secret", "user": {"id": "u-1"}}"#,
		)
		.unwrap();
		let debug = format!("{session:?}");
		assert!(!debug.contains("at_secret"));
	}

	#[test]
	fn test_error_body_prefers_description() {
		assert_eq!(
			ErrorBody::parse(r#"{"error":"invalid_grant","error_description":"code expired"}"#),
			"code expired"
		);
		assert_eq!(ErrorBody::parse(r#"{"msg":"User already registered"}"#), "User already registered");
		assert_eq!(ErrorBody::parse("plain text"), "plain text");
	}
}
