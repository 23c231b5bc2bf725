// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payment event dispatch.
//!
//! Access transitions:
//!
//! | Event | Effect |
//! |---|---|
//! | `checkout.session.completed` for the configured price | grant, linking customer and price |
//! | `customer.subscription.deleted` | revoke every profile of the customer |
//! | `invoice.paid` for the price on file | grant |
//! | anything else | ignored |
//!
//! With an event ledger, each event id is claimed before dispatch so a
//! redelivery is skipped (a resend of a failed event is processed again), and access changes carry the event's `created`
//! timestamp so an older event cannot overwrite a newer decision.

use std::sync::Arc;

use founderdex_server_auth_supabase::IdentityProvider;
use founderdex_server_billing_stripe::{
	event_types, CheckoutSession, Invoice, PaymentProvider, Subscription, WebhookEvent,
};
use founderdex_server_db::{
	AccessChange, PaymentEventStore, ProfileStore, UserProfile, FAILED_OUTCOME,
};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{BillingError, Result};

/// What processing an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
	Granted,
	Revoked,
	/// The event type or its price does not affect access.
	Ignored,
	/// A newer event already decided access for this profile.
	Stale,
	/// The event id was already processed.
	Duplicate,
	/// No profile is linked to the event's customer.
	NoProfile,
}

impl WebhookOutcome {
	pub fn as_str(&self) -> &'static str {
		match self {
			WebhookOutcome::Granted => "granted",
			WebhookOutcome::Revoked => "revoked",
			WebhookOutcome::Ignored => "ignored",
			WebhookOutcome::Stale => "stale",
			WebhookOutcome::Duplicate => "duplicate",
			WebhookOutcome::NoProfile => "no_profile",
		}
	}

	fn from_access_change(change: AccessChange, applied: WebhookOutcome) -> Self {
		match change {
			AccessChange::Applied => applied,
			AccessChange::Stale => WebhookOutcome::Stale,
			AccessChange::NotFound => WebhookOutcome::NoProfile,
		}
	}
}

pub struct WebhookProcessor {
	profiles: Arc<dyn ProfileStore>,
	events: Option<Arc<dyn PaymentEventStore>>,
	payments: Arc<dyn PaymentProvider>,
	identities: Arc<dyn IdentityProvider>,
	price_id: Option<String>,
}

impl WebhookProcessor {
	/// `price_id` is the one price whose checkout grants access. Without it,
	/// completed checkouts are ignored.
	pub fn new(
		profiles: Arc<dyn ProfileStore>,
		payments: Arc<dyn PaymentProvider>,
		identities: Arc<dyn IdentityProvider>,
		price_id: Option<String>,
	) -> Self {
		Self {
			profiles,
			events: None,
			payments,
			identities,
			price_id,
		}
	}

	pub fn with_event_ledger(mut self, events: Arc<dyn PaymentEventStore>) -> Self {
		self.events = Some(events);
		self
	}

	fn event_created(&self, event: &WebhookEvent) -> Option<i64> {
		self.events.as_ref().map(|_| event.created)
	}

	#[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
	pub async fn process(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
		if let Some(events) = &self.events {
			let claimed = events
				.claim_event(
					&event.id,
					&event.event_type,
					event.customer_id().as_deref(),
					event.created,
				)
				.await?;
			if !claimed {
				info!("duplicate event delivery skipped");
				return Ok(WebhookOutcome::Duplicate);
			}
		}

		let result = self.dispatch(event).await;

		if let Some(events) = &self.events {
			let outcome = match &result {
				Ok(outcome) => outcome.as_str(),
				Err(_) => FAILED_OUTCOME,
			};
			if let Err(e) = events.record_outcome(&event.id, outcome).await {
				warn!(error = %e, "failed to record event outcome");
			}
		}

		match &result {
			Ok(outcome) => info!(outcome = outcome.as_str(), "payment event processed"),
			Err(e) => error!(error = %e, "payment event processing failed"),
		}
		result
	}

	async fn dispatch(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
		match event.event_type.as_str() {
			event_types::CHECKOUT_SESSION_COMPLETED => self.checkout_completed(event).await,
			event_types::CUSTOMER_SUBSCRIPTION_DELETED => self.subscription_deleted(event).await,
			event_types::INVOICE_PAID => self.invoice_paid(event).await,
			event_types::CHECKOUT_SESSION_EXPIRED
			| event_types::CUSTOMER_SUBSCRIPTION_UPDATED
			| event_types::INVOICE_PAYMENT_FAILED => {
				debug!("event type has no access effect");
				Ok(WebhookOutcome::Ignored)
			}
			other => {
				debug!(event_type = other, "unhandled event type");
				Ok(WebhookOutcome::Ignored)
			}
		}
	}

	async fn checkout_completed(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
		let summary: CheckoutSession = event.object()?;
		let session = self
			.payments
			.retrieve_checkout_session(&summary.id)
			.await?;

		let Some(configured) = self.price_id.as_deref() else {
			warn!("no access price configured, ignoring completed checkout");
			return Ok(WebhookOutcome::Ignored);
		};
		let price_id = session.price_id();
		if price_id != Some(configured) {
			debug!(price_id = ?price_id, "checkout was for another price");
			return Ok(WebhookOutcome::Ignored);
		}

		let email = match session.customer.as_deref() {
			Some(customer_id) => self.payments.retrieve_customer(customer_id).await?.email,
			None => None,
		}
		.or_else(|| session.customer_details.as_ref()?.email.clone());

		let profile = match session.client_reference_id.as_deref() {
			Some(user_id) => {
				self.profiles
					.ensure_profile(user_id, email.as_deref())
					.await?
			}
			None => self.profile_for_payer(email.as_deref()).await?,
		};

		let change = self
			.profiles
			.grant_purchase(
				&profile.id,
				session.customer.as_deref(),
				Some(configured),
				self.event_created(event),
			)
			.await?;
		Ok(WebhookOutcome::from_access_change(
			change,
			WebhookOutcome::Granted,
		))
	}

	/// Resolve the profile of a payer who checked out without signing in,
	/// creating an identity for them if their email is unknown.
	async fn profile_for_payer(&self, email: Option<&str>) -> Result<UserProfile> {
		let email = email.ok_or_else(|| {
			BillingError::Incomplete("checkout has neither a user reference nor an email".to_string())
		})?;

		if let Some(profile) = self.profiles.find_by_email(email).await? {
			return Ok(profile);
		}

		warn!("creating identity for payer with no account");
		let identity = self.identities.admin_create_user(email).await?;
		Ok(self
			.profiles
			.ensure_profile(&identity.id, Some(email))
			.await?)
	}

	async fn subscription_deleted(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
		let summary: Subscription = event.object()?;
		let subscription = self.payments.retrieve_subscription(&summary.id).await?;
		let customer_id = subscription
			.customer
			.or(summary.customer)
			.ok_or_else(|| BillingError::Incomplete(format!("subscription {} has no customer", summary.id)))?;

		let change = self
			.profiles
			.set_access_for_customer(&customer_id, false, self.event_created(event))
			.await?;
		Ok(WebhookOutcome::from_access_change(
			change,
			WebhookOutcome::Revoked,
		))
	}

	async fn invoice_paid(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
		let invoice: Invoice = event.object()?;
		let customer_id = invoice
			.customer
			.as_deref()
			.ok_or_else(|| BillingError::Incomplete(format!("invoice {} has no customer", invoice.id)))?;

		let Some(profile) = self.profiles.find_by_customer_id(customer_id).await? else {
			return Ok(WebhookOutcome::NoProfile);
		};

		let price_id = invoice.price_id();
		if price_id.is_none() || profile.price_id.as_deref() != price_id {
			debug!(price_id = ?price_id, "invoice is for a price the profile did not buy");
			return Ok(WebhookOutcome::Ignored);
		}

		let change = self
			.profiles
			.set_access(&profile.id, true, self.event_created(event))
			.await?;
		Ok(WebhookOutcome::from_access_change(
			change,
			WebhookOutcome::Granted,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeIdentities, FakePayments};
	use founderdex_server_db::testing::create_migrated_test_pool;
	use founderdex_server_db::{PaymentEventRepository, ProfileRepository};
	use serde_json::json;

	const PRICE: &str = "price_access";

	struct Harness {
		processor: WebhookProcessor,
		profiles: ProfileRepository,
		events: PaymentEventRepository,
		identities: Arc<FakeIdentities>,
	}

	async fn harness(payments: FakePayments) -> Harness {
		let pool = create_migrated_test_pool().await;
		let profiles = ProfileRepository::new(pool.clone());
		let events = PaymentEventRepository::new(pool);
		let identities = Arc::new(FakeIdentities::default());
		let processor = WebhookProcessor::new(
			Arc::new(profiles.clone()),
			Arc::new(payments),
			identities.clone(),
			Some(PRICE.to_string()),
		)
		.with_event_ledger(Arc::new(events.clone()));
		Harness {
			processor,
			profiles,
			events,
			identities,
		}
	}

	fn event(id: &str, event_type: &str, created: i64, object: serde_json::Value) -> WebhookEvent {
		serde_json::from_value(json!({
			"id": id,
			"type": event_type,
			"created": created,
			"data": {"object": object}
		}))
		.unwrap()
	}

	fn checkout_event(id: &str, created: i64) -> WebhookEvent {
		event(
			id,
			event_types::CHECKOUT_SESSION_COMPLETED,
			created,
			json!({"id": "cs_1", "customer": "cus_1"}),
		)
	}

	fn deleted_event(id: &str, created: i64) -> WebhookEvent {
		event(
			id,
			event_types::CUSTOMER_SUBSCRIPTION_DELETED,
			created,
			json!({"id": "sub_1", "customer": "cus_1"}),
		)
	}

	fn paying_session(reference: Option<&str>, price: &str) -> FakePayments {
		FakePayments::default()
			.with_session(json!({
				"id": "cs_1",
				"customer": "cus_1",
				"client_reference_id": reference,
				"line_items": {"data": [{"price": {"id": price}}]}
			}))
			.with_customer("cus_1", Some("ada@example.com"))
			.with_subscription("sub_1", "cus_1")
	}

	#[tokio::test]
	async fn test_checkout_for_configured_price_grants_access() {
		let h = harness(paying_session(Some("user-1"), PRICE)).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();

		let outcome = h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Granted);

		let profile = h.profiles.get_profile("user-1").await.unwrap().unwrap();
		assert!(profile.has_access);
		assert_eq!(profile.customer_id.as_deref(), Some("cus_1"));
		assert_eq!(profile.price_id.as_deref(), Some(PRICE));
		assert_eq!(profile.email.as_deref(), Some("ada@example.com"));

		let recorded = h.events.get_event("evt_1").await.unwrap().unwrap();
		assert_eq!(recorded.outcome.as_deref(), Some("granted"));
	}

	#[tokio::test]
	async fn test_checkout_for_other_price_changes_nothing() {
		let h = harness(paying_session(Some("user-1"), "price_other")).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();

		let outcome = h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Ignored);

		let profile = h.profiles.get_profile("user-1").await.unwrap().unwrap();
		assert!(!profile.has_access);
		assert_eq!(profile.customer_id, None);
	}

	#[tokio::test]
	async fn test_checkout_without_reference_uses_existing_email() {
		let h = harness(paying_session(None, PRICE)).await;
		h.profiles
			.ensure_profile("user-7", Some("ADA@example.com"))
			.await
			.unwrap();

		let outcome = h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Granted);
		assert!(h.profiles.get_profile("user-7").await.unwrap().unwrap().has_access);
		assert!(h.identities.created().is_empty());
	}

	#[tokio::test]
	async fn test_checkout_from_unknown_payer_creates_identity() {
		let h = harness(paying_session(None, PRICE)).await;

		let outcome = h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Granted);
		assert_eq!(h.identities.created(), vec!["ada@example.com".to_string()]);

		let profile = h
			.profiles
			.find_by_email("ada@example.com")
			.await
			.unwrap()
			.unwrap();
		assert!(profile.has_access);
		assert_eq!(profile.customer_id.as_deref(), Some("cus_1"));
	}

	#[tokio::test]
	async fn test_subscription_deleted_revokes() {
		let h = harness(paying_session(Some("user-1"), PRICE)).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();
		h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();

		let outcome = h.processor.process(&deleted_event("evt_2", 200)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Revoked);
		assert!(!h.profiles.get_profile("user-1").await.unwrap().unwrap().has_access);
	}

	#[tokio::test]
	async fn test_redelivery_is_applied_once() {
		let h = harness(paying_session(Some("user-1"), PRICE)).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();
		h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		h.processor.process(&deleted_event("evt_2", 200)).await.unwrap();

		let outcome = h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Duplicate);
		assert!(!h.profiles.get_profile("user-1").await.unwrap().unwrap().has_access);
	}

	#[tokio::test]
	async fn test_revoke_older_than_grant_is_stale() {
		let h = harness(paying_session(Some("user-1"), PRICE)).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();
		h.processor.process(&checkout_event("evt_2", 200)).await.unwrap();

		let outcome = h.processor.process(&deleted_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Stale);
		assert!(h.profiles.get_profile("user-1").await.unwrap().unwrap().has_access);
	}

	#[tokio::test]
	async fn test_invoice_paid_regrants_matching_price() {
		let h = harness(paying_session(Some("user-1"), PRICE)).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();
		h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		h.processor.process(&deleted_event("evt_2", 200)).await.unwrap();

		let other = event(
			"evt_3",
			event_types::INVOICE_PAID,
			300,
			json!({"id": "in_1", "customer": "cus_1", "lines": {"data": [{"price": {"id": "price_other"}}]}}),
		);
		assert_eq!(h.processor.process(&other).await.unwrap(), WebhookOutcome::Ignored);
		assert!(!h.profiles.get_profile("user-1").await.unwrap().unwrap().has_access);

		let matching = event(
			"evt_4",
			event_types::INVOICE_PAID,
			400,
			json!({"id": "in_2", "customer": "cus_1", "lines": {"data": [{"price": {"id": PRICE}}]}}),
		);
		assert_eq!(h.processor.process(&matching).await.unwrap(), WebhookOutcome::Granted);
		assert!(h.profiles.get_profile("user-1").await.unwrap().unwrap().has_access);
	}

	#[tokio::test]
	async fn test_invoice_for_unknown_customer() {
		let h = harness(FakePayments::default()).await;
		let paid = event(
			"evt_1",
			event_types::INVOICE_PAID,
			100,
			json!({"id": "in_1", "customer": "cus_nobody", "lines": {"data": []}}),
		);
		assert_eq!(h.processor.process(&paid).await.unwrap(), WebhookOutcome::NoProfile);
	}

	#[tokio::test]
	async fn test_reserved_and_unknown_types_are_ignored() {
		let h = harness(FakePayments::default()).await;
		for (i, event_type) in [
			event_types::CHECKOUT_SESSION_EXPIRED,
			event_types::CUSTOMER_SUBSCRIPTION_UPDATED,
			event_types::INVOICE_PAYMENT_FAILED,
			"charge.refunded",
		]
		.into_iter()
		.enumerate()
		{
			let e = event(&format!("evt_{i}"), event_type, 100, json!({"id": "x"}));
			assert_eq!(h.processor.process(&e).await.unwrap(), WebhookOutcome::Ignored);
		}
	}

	#[tokio::test]
	async fn test_provider_failure_is_recorded() {
		let h = harness(FakePayments::default()).await;
		let result = h.processor.process(&checkout_event("evt_1", 100)).await;
		assert!(matches!(result, Err(BillingError::Payment(_))));

		let recorded = h.events.get_event("evt_1").await.unwrap().unwrap();
		assert_eq!(recorded.outcome.as_deref(), Some(FAILED_OUTCOME));
	}

	#[tokio::test]
	async fn test_resent_failed_event_is_processed() {
		let pool = create_migrated_test_pool().await;
		let profiles = ProfileRepository::new(pool.clone());
		let events = Arc::new(PaymentEventRepository::new(pool));
		profiles.ensure_profile("user-1", None).await.unwrap();
		let processor_with = |payments: FakePayments| {
			WebhookProcessor::new(
				Arc::new(profiles.clone()),
				Arc::new(payments),
				Arc::new(FakeIdentities::default()),
				Some(PRICE.to_string()),
			)
			.with_event_ledger(events.clone())
		};

		let broken = processor_with(FakePayments::default());
		assert!(broken.process(&checkout_event("evt_1", 100)).await.is_err());
		assert!(!profiles.get_profile("user-1").await.unwrap().unwrap().has_access);

		let healthy = processor_with(paying_session(Some("user-1"), PRICE));
		let outcome = healthy.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Granted);
		assert!(profiles.get_profile("user-1").await.unwrap().unwrap().has_access);

		let recorded = events.get_event("evt_1").await.unwrap().unwrap();
		assert_eq!(recorded.outcome.as_deref(), Some("granted"));
		assert_eq!(
			healthy.process(&checkout_event("evt_1", 100)).await.unwrap(),
			WebhookOutcome::Duplicate
		);
	}

	#[tokio::test]
	async fn test_stale_checkout_keeps_customer() {
		let h = harness(paying_session(Some("user-1"), PRICE)).await;
		h.profiles.ensure_profile("user-1", None).await.unwrap();
		h.profiles
			.grant_purchase("user-1", Some("cus_current"), Some(PRICE), Some(300))
			.await
			.unwrap();

		let outcome = h.processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Stale);

		let profile = h.profiles.get_profile("user-1").await.unwrap().unwrap();
		assert_eq!(profile.customer_id.as_deref(), Some("cus_current"));
		assert_eq!(profile.access_event_at, Some(300));
		let recorded = h.events.get_event("evt_1").await.unwrap().unwrap();
		assert_eq!(recorded.outcome.as_deref(), Some("stale"));
	}

	#[tokio::test]
	async fn test_without_ledger_events_reapply() {
		let pool = create_migrated_test_pool().await;
		let profiles = ProfileRepository::new(pool);
		profiles.ensure_profile("user-1", None).await.unwrap();
		let processor = WebhookProcessor::new(
			Arc::new(profiles.clone()),
			Arc::new(paying_session(Some("user-1"), PRICE)),
			Arc::new(FakeIdentities::default()),
			Some(PRICE.to_string()),
		);

		processor.process(&checkout_event("evt_2", 200)).await.unwrap();
		let outcome = processor.process(&deleted_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Revoked);
		assert!(!profiles.get_profile("user-1").await.unwrap().unwrap().has_access);
	}

	#[tokio::test]
	async fn test_no_configured_price_ignores_checkout() {
		let pool = create_migrated_test_pool().await;
		let profiles = ProfileRepository::new(pool);
		profiles.ensure_profile("user-1", None).await.unwrap();
		let processor = WebhookProcessor::new(
			Arc::new(profiles.clone()),
			Arc::new(paying_session(Some("user-1"), PRICE)),
			Arc::new(FakeIdentities::default()),
			None,
		);

		let outcome = processor.process(&checkout_event("evt_1", 100)).await.unwrap();
		assert_eq!(outcome, WebhookOutcome::Ignored);
		assert!(!profiles.get_profile("user-1").await.unwrap().unwrap().has_access);
	}
}
