// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Supabase Auth client.

use founderdex_common_http::RetryableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("Request timed out")]
	Timeout,

	/// The auth code was rejected (expired, reused or unknown).
	#[error("Invalid auth code: {0}")]
	InvalidCode(String),

	/// The API key or access token was rejected.
	#[error("Unauthorized")]
	Unauthorized,

	/// A call needs a credential that is not configured.
	#[error("Not configured: {0}")]
	NotConfigured(&'static str),

	#[error("Invalid response from Supabase: {0}")]
	InvalidResponse(String),

	#[error("Supabase API error: {status} - {message}")]
	ApiError { status: u16, message: String },
}

impl RetryableError for AuthError {
	fn is_retryable(&self) -> bool {
		match self {
			AuthError::Network(e) => e.is_retryable(),
			AuthError::Timeout => true,
			AuthError::ApiError { status, .. } => *status == 429 || *status >= 500,
			AuthError::InvalidCode(_)
			| AuthError::Unauthorized
			| AuthError::NotConfigured(_)
			| AuthError::InvalidResponse(_) => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryable_classification() {
		assert!(AuthError::Timeout.is_retryable());
		assert!(AuthError::ApiError {
			status: 503,
			message: String::new()
		}
		.is_retryable());
		assert!(!AuthError::ApiError {
			status: 422,
			message: String::new()
		}
		.is_retryable());
		assert!(!AuthError::Unauthorized.is_retryable());
		assert!(!AuthError::InvalidCode("expired".to_string()).is_retryable());
	}
}
