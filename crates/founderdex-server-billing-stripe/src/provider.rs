// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::StripeError;
use crate::types::{CheckoutSession, CheckoutSessionParams, Customer, Subscription};

/// Payment processor operations used by checkout and webhook handling.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
	/// Create a hosted checkout session and return its redirect URL.
	async fn create_checkout_session(
		&self,
		params: &CheckoutSessionParams,
	) -> Result<String, StripeError>;

	/// Retrieve a checkout session with its line items expanded.
	async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, StripeError>;

	async fn retrieve_customer(&self, id: &str) -> Result<Customer, StripeError>;

	async fn retrieve_subscription(&self, id: &str) -> Result<Subscription, StripeError>;
}
