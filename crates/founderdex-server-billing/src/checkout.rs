// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Checkout session requests.

use std::sync::Arc;

use founderdex_server_auth_supabase::Identity;
use founderdex_server_billing_stripe::{CheckoutMode, CheckoutSessionParams, PaymentProvider};
use founderdex_server_db::ProfileStore;
use tracing::{info, instrument};

use crate::error::{BillingError, Result, MODE_REQUIRED, PRICE_ID_REQUIRED, URLS_REQUIRED};

/// A checkout request as received, before validation.
#[derive(Debug, Clone, Default)]
pub struct CheckoutInput {
	pub price_id: Option<String>,
	pub mode: Option<String>,
	pub success_url: Option<String>,
	pub cancel_url: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}

impl CheckoutInput {
	/// Check every field, reporting the first missing one.
	pub fn validate(&self) -> Result<(String, CheckoutMode, String, String)> {
		let price_id =
			non_blank(self.price_id.as_deref()).ok_or(BillingError::InvalidRequest(PRICE_ID_REQUIRED))?;
		let (success_url, cancel_url) = match (
			non_blank(self.success_url.as_deref()),
			non_blank(self.cancel_url.as_deref()),
		) {
			(Some(success), Some(cancel)) => (success, cancel),
			_ => return Err(BillingError::InvalidRequest(URLS_REQUIRED)),
		};
		let mode = non_blank(self.mode.as_deref())
			.and_then(|m| m.parse::<CheckoutMode>().ok())
			.ok_or(BillingError::InvalidRequest(MODE_REQUIRED))?;

		Ok((
			price_id.to_string(),
			mode,
			success_url.to_string(),
			cancel_url.to_string(),
		))
	}
}

pub struct CheckoutService {
	profiles: Arc<dyn ProfileStore>,
	payments: Arc<dyn PaymentProvider>,
}

impl CheckoutService {
	pub fn new(profiles: Arc<dyn ProfileStore>, payments: Arc<dyn PaymentProvider>) -> Self {
		Self { profiles, payments }
	}

	/// Create a checkout session and return its redirect URL.
	///
	/// A signed-in caller is attached as the client reference, with their
	/// known customer id or else their email.
	#[instrument(skip(self, input, user), fields(signed_in = user.is_some()))]
	pub async fn start_checkout(
		&self,
		input: &CheckoutInput,
		user: Option<&Identity>,
	) -> Result<String> {
		let (price_id, mode, success_url, cancel_url) = input.validate()?;

		let customer_id = match user {
			Some(user) => self
				.profiles
				.get_profile(&user.id)
				.await?
				.and_then(|profile| profile.customer_id),
			None => None,
		};

		let params = CheckoutSessionParams {
			price_id,
			mode,
			success_url,
			cancel_url,
			client_reference_id: user.map(|u| u.id.clone()),
			customer_id,
			customer_email: user.and_then(|u| u.email.clone()),
		};

		let url = self.payments.create_checkout_session(&params).await?;
		info!(mode = %params.mode, "checkout session started");
		Ok(url)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeIdentities, FakePayments};
	use founderdex_server_db::testing::create_migrated_test_pool;
	use founderdex_server_db::ProfileRepository;

	fn input() -> CheckoutInput {
		CheckoutInput {
			price_id: Some("price_1".to_string()),
			mode: Some("payment".to_string()),
			success_url: Some("https://founderdex.com/".to_string()),
			cancel_url: Some("https://founderdex.com/checkout".to_string()),
		}
	}

	fn rejection(input: CheckoutInput) -> &'static str {
		match input.validate() {
			Err(BillingError::InvalidRequest(message)) => message,
			other => panic!("expected rejection, got {other:?}"),
		}
	}

	#[test]
	fn test_missing_fields_name_the_field() {
		assert_eq!(
			rejection(CheckoutInput {
				price_id: None,
				..input()
			}),
			PRICE_ID_REQUIRED
		);
		assert_eq!(
			rejection(CheckoutInput {
				cancel_url: Some("  ".to_string()),
				..input()
			}),
			URLS_REQUIRED
		);
		assert_eq!(
			rejection(CheckoutInput {
				mode: None,
				..input()
			}),
			MODE_REQUIRED
		);
		assert_eq!(
			rejection(CheckoutInput {
				mode: Some("setup".to_string()),
				..input()
			}),
			MODE_REQUIRED
		);
	}

	async fn service(payments: Arc<FakePayments>) -> (CheckoutService, ProfileRepository) {
		let profiles = ProfileRepository::new(create_migrated_test_pool().await);
		let service = CheckoutService::new(Arc::new(profiles.clone()), payments);
		(service, profiles)
	}

	#[tokio::test]
	async fn test_anonymous_checkout() {
		let payments = Arc::new(FakePayments::default());
		let (service, _) = service(payments.clone()).await;

		let url = service.start_checkout(&input(), None).await.unwrap();
		assert!(!url.is_empty());

		let sent = payments.checkouts();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].client_reference_id, None);
		assert_eq!(sent[0].customer_email, None);
		assert_eq!(sent[0].mode, CheckoutMode::Payment);
	}

	#[tokio::test]
	async fn test_signed_in_checkout_reuses_customer() {
		let payments = Arc::new(FakePayments::default());
		let (service, profiles) = service(payments.clone()).await;
		profiles
			.ensure_profile("user-1", Some("ada@example.com"))
			.await
			.unwrap();
		profiles
			.grant_purchase("user-1", Some("cus_1"), None, None)
			.await
			.unwrap();

		let user = FakeIdentities::identity("user-1", "ada@example.com");
		service.start_checkout(&input(), Some(&user)).await.unwrap();

		let sent = payments.checkouts();
		assert_eq!(sent[0].client_reference_id.as_deref(), Some("user-1"));
		assert_eq!(sent[0].customer_id.as_deref(), Some("cus_1"));
		assert_eq!(sent[0].customer_email.as_deref(), Some("ada@example.com"));
	}

	#[tokio::test]
	async fn test_invalid_request_never_reaches_provider() {
		let payments = Arc::new(FakePayments::default());
		let (service, _) = service(payments.clone()).await;

		let result = service
			.start_checkout(
				&CheckoutInput {
					success_url: None,
					..input()
				},
				None,
			)
			.await;
		assert!(matches!(result, Err(BillingError::InvalidRequest(URLS_REQUIRED))));
		assert!(payments.checkouts().is_empty());
	}

	#[tokio::test]
	async fn test_provider_failure() {
		let payments = Arc::new(FakePayments::default().failing_checkout());
		let (service, _) = service(payments).await;
		let result = service.start_checkout(&input(), None).await;
		assert!(matches!(result, Err(BillingError::Payment(_))));
	}
}
