// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stripe integration for Founderdex.
//!
//! Provides:
//! - [`StripeClient`] for creating checkout sessions and retrieving the
//!   sessions, customers and subscriptions referenced by webhook events
//! - [`construct_event`] to verify and parse webhook deliveries
//! - [`PaymentProvider`], the seam the billing service is written against

pub mod client;
pub mod error;
pub mod provider;
pub mod types;
pub mod webhook;

pub use client::{StripeClient, DEFAULT_API_BASE};
pub use error::{StripeError, WebhookError};
pub use founderdex_common_http::RetryConfig;
pub use provider::PaymentProvider;
pub use types::{
	event_types, CheckoutMode, CheckoutSession, CheckoutSessionParams, Customer, Invoice,
	Subscription, WebhookEvent,
};
pub use webhook::{construct_event, SIGNATURE_HEADER};
