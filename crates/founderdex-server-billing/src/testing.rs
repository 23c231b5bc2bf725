// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory payment and identity providers for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use founderdex_server_auth_supabase::{AuthError, Identity, IdentityProvider, Session};
use founderdex_server_billing_stripe::{
	CheckoutSession, CheckoutSessionParams, Customer, PaymentProvider, StripeError, Subscription,
};

/// Serves canned Stripe objects and records checkout requests.
#[derive(Default)]
pub struct FakePayments {
	sessions: HashMap<String, CheckoutSession>,
	customers: HashMap<String, Customer>,
	subscriptions: HashMap<String, Subscription>,
	checkouts: Mutex<Vec<CheckoutSessionParams>>,
	fail_checkout: bool,
}

impl FakePayments {
	pub fn with_session(mut self, session: serde_json::Value) -> Self {
		let session: CheckoutSession = serde_json::from_value(session).unwrap();
		self.sessions.insert(session.id.clone(), session);
		self
	}

	pub fn with_customer(mut self, id: &str, email: Option<&str>) -> Self {
		self.customers.insert(
			id.to_string(),
			Customer {
				id: id.to_string(),
				email: email.map(str::to_string),
				deleted: false,
			},
		);
		self
	}

	pub fn with_subscription(mut self, id: &str, customer_id: &str) -> Self {
		self.subscriptions.insert(
			id.to_string(),
			Subscription {
				id: id.to_string(),
				customer: Some(customer_id.to_string()),
				status: Some("canceled".to_string()),
			},
		);
		self
	}

	/// Make checkout creation fail with a server error.
	pub fn failing_checkout(mut self) -> Self {
		self.fail_checkout = true;
		self
	}

	pub fn checkouts(&self) -> Vec<CheckoutSessionParams> {
		self.checkouts.lock().unwrap().clone()
	}
}

#[async_trait]
impl PaymentProvider for FakePayments {
	async fn create_checkout_session(
		&self,
		params: &CheckoutSessionParams,
	) -> Result<String, StripeError> {
		if self.fail_checkout {
			return Err(StripeError::ApiError {
				status: 500,
				message: "checkout unavailable".to_string(),
			});
		}
		let mut checkouts = self.checkouts.lock().unwrap();
		checkouts.push(params.clone());
		Ok(format!(
			"https://checkout.stripe.test/c/pay/cs_test_{}",
			checkouts.len()
		))
	}

	async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, StripeError> {
		self.sessions
			.get(id)
			.cloned()
			.ok_or_else(|| StripeError::NotFound(format!("No such checkout.session: '{id}'")))
	}

	async fn retrieve_customer(&self, id: &str) -> Result<Customer, StripeError> {
		self.customers
			.get(id)
			.cloned()
			.ok_or_else(|| StripeError::NotFound(format!("No such customer: '{id}'")))
	}

	async fn retrieve_subscription(&self, id: &str) -> Result<Subscription, StripeError> {
		self.subscriptions
			.get(id)
			.cloned()
			.ok_or_else(|| StripeError::NotFound(format!("No such subscription: '{id}'")))
	}
}

/// Accepts codes and tokens registered up front. Users created through
/// `admin_create_user` get sequential ids.
#[derive(Default)]
pub struct FakeIdentities {
	codes: HashMap<String, (String, Identity)>,
	tokens: HashMap<String, Identity>,
	created: Mutex<Vec<String>>,
	signed_out: Mutex<Vec<String>>,
}

impl FakeIdentities {
	pub fn identity(id: &str, email: &str) -> Identity {
		Identity {
			id: id.to_string(),
			email: Some(email.to_string()),
			created_at: None,
			user_metadata: serde_json::Value::Null,
		}
	}

	/// `code` exchanges for a session whose access token is `token`, and
	/// `token` resolves to `identity`.
	pub fn with_login(mut self, code: &str, token: &str, identity: Identity) -> Self {
		self.codes
			.insert(code.to_string(), (token.to_string(), identity.clone()));
		self.tokens.insert(token.to_string(), identity);
		self
	}

	pub fn created(&self) -> Vec<String> {
		self.created.lock().unwrap().clone()
	}

	pub fn signed_out(&self) -> Vec<String> {
		self.signed_out.lock().unwrap().clone()
	}
}

#[async_trait]
impl IdentityProvider for FakeIdentities {
	async fn exchange_code_for_session(
		&self,
		code: &str,
		_code_verifier: Option<&str>,
	) -> Result<Session, AuthError> {
		let (token, identity) = self
			.codes
			.get(code)
			.ok_or_else(|| AuthError::InvalidCode("invalid flow state".to_string()))?;
		let session = serde_json::json!({
			"access_token": token,
			"token_type": "bearer",
			"expires_in": 3600,
			"user": identity,
		});
		Ok(serde_json::from_value(session).unwrap())
	}

	async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
		Ok(self.tokens.get(access_token).cloned())
	}

	async fn admin_create_user(&self, email: &str) -> Result<Identity, AuthError> {
		let mut created = self.created.lock().unwrap();
		created.push(email.to_string());
		Ok(Self::identity(&format!("created-{}", created.len()), email))
	}

	async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
		self.signed_out
			.lock()
			.unwrap()
			.push(access_token.to_string());
		Ok(())
	}
}
