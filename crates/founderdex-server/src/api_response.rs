// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error response helpers for handlers.

use axum::{http::StatusCode, Json};
use founderdex_server_api::ErrorResponse;
use serde::Serialize;

/// Response bodies with `error` and `message` fields.
pub trait ApiErrorResponse: Serialize + Send {
	fn new(error: impl Into<String>, message: impl Into<String>) -> Self;
}

impl ApiErrorResponse for ErrorResponse {
	fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		ErrorResponse::new(error, message)
	}
}

/// Create a 400 Bad Request response.
pub fn bad_request<T: ApiErrorResponse>(
	error: impl Into<String>,
	message: impl Into<String>,
) -> (StatusCode, Json<T>) {
	(StatusCode::BAD_REQUEST, Json(T::new(error, message)))
}

/// Create a 403 Forbidden response.
pub fn forbidden<T: ApiErrorResponse>(
	error: impl Into<String>,
	message: impl Into<String>,
) -> (StatusCode, Json<T>) {
	(StatusCode::FORBIDDEN, Json(T::new(error, message)))
}

/// Create a 500 Internal Server Error response.
pub fn internal_error<T: ApiErrorResponse>(message: impl Into<String>) -> (StatusCode, Json<T>) {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(T::new("internal_error", message)),
	)
}

/// Create a 503 response for a collaborator that is not configured.
pub fn not_configured<T: ApiErrorResponse>(message: impl Into<String>) -> (StatusCode, Json<T>) {
	(
		StatusCode::SERVICE_UNAVAILABLE,
		Json(T::new("not_configured", message)),
	)
}
