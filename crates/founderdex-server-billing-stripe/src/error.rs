// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Stripe client.

use founderdex_common_http::RetryableError;
use founderdex_common_webhook::SignatureError;
use thiserror::Error;

/// Errors from Stripe API calls.
#[derive(Debug, Error)]
pub enum StripeError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("Request timed out")]
	Timeout,

	#[error("Rate limit exceeded")]
	RateLimited,

	/// The secret key was rejected.
	#[error("Invalid API key")]
	Unauthorized,

	/// Stripe rejected the request parameters.
	#[error("Invalid request: {message}")]
	InvalidRequest {
		message: String,
		param: Option<String>,
	},

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Invalid response from Stripe: {0}")]
	InvalidResponse(String),

	#[error("Stripe API error: {status} - {message}")]
	ApiError { status: u16, message: String },
}

impl RetryableError for StripeError {
	fn is_retryable(&self) -> bool {
		match self {
			StripeError::Network(e) => e.is_retryable(),
			StripeError::Timeout => true,
			StripeError::RateLimited => true,
			StripeError::ApiError { status, .. } => *status >= 500,
			StripeError::Unauthorized
			| StripeError::InvalidRequest { .. }
			| StripeError::NotFound(_)
			| StripeError::InvalidResponse(_) => false,
		}
	}
}

/// Errors turning a webhook delivery into an event.
#[derive(Debug, Error)]
pub enum WebhookError {
	#[error("signature verification failed: {0}")]
	Signature(#[from] SignatureError),

	#[error("invalid event payload: {0}")]
	Payload(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryable_classification() {
		assert!(StripeError::RateLimited.is_retryable());
		assert!(StripeError::ApiError {
			status: 502,
			message: String::new()
		}
		.is_retryable());
		assert!(!StripeError::InvalidRequest {
			message: "No such price".to_string(),
			param: Some("line_items[0][price]".to_string()),
		}
		.is_retryable());
		assert!(!StripeError::NotFound("cus_x".to_string()).is_retryable());
	}
}
