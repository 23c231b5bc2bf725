// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Paid access for Founderdex.
//!
//! [`WebhookProcessor`] turns verified payment events into `has_access`
//! changes on user profiles. [`CheckoutService`] starts hosted checkouts.
//! Both work against the provider traits so they can be tested with the
//! fakes in [`testing`].

pub mod checkout;
pub mod error;
pub mod testing;
pub mod webhook;

pub use checkout::{CheckoutInput, CheckoutService};
pub use error::{BillingError, Result, MODE_REQUIRED, PRICE_ID_REQUIRED, URLS_REQUIRED};
pub use webhook::{WebhookOutcome, WebhookProcessor};
