// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use founderdex_server_auth_supabase::AuthError;
use founderdex_server_billing_stripe::StripeError;
use founderdex_server_db::DbError;
use thiserror::Error;

pub const PRICE_ID_REQUIRED: &str = "Price ID is required";
pub const URLS_REQUIRED: &str = "Success and cancel URLs are required";
pub const MODE_REQUIRED: &str =
	"Mode is required (either 'payment' for one-time payments or 'subscription' for recurring subscription)";

#[derive(Debug, Error)]
pub enum BillingError {
	/// A checkout request is missing or has an invalid field.
	#[error("{0}")]
	InvalidRequest(&'static str),

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("payment provider error: {0}")]
	Payment(#[from] StripeError),

	#[error("identity provider error: {0}")]
	Identity(#[from] AuthError),

	#[error("event object could not be decoded: {0}")]
	EventObject(#[from] serde_json::Error),

	/// The event or the objects it references lack data needed to act on it.
	#[error("incomplete event: {0}")]
	Incomplete(String),
}

pub type Result<T> = std::result::Result<T, BillingError>;
