// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stripe REST client.

use std::time::Duration;

use async_trait::async_trait;
use founderdex_common_http::{retry, RetryConfig};
use founderdex_common_secret::SecretString;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::error::StripeError;
use crate::provider::PaymentProvider;
use crate::types::{CheckoutSession, CheckoutSessionParams, Customer, Subscription};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
	error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	param: Option<String>,
}

impl ErrorEnvelope {
	fn parse(body: &str) -> (String, Option<String>) {
		match serde_json::from_str::<ErrorEnvelope>(body) {
			Ok(envelope) => (
				envelope.error.message.unwrap_or_else(|| body.to_string()),
				envelope.error.param,
			),
			Err(_) => (body.to_string(), None),
		}
	}
}

#[derive(Debug, Clone)]
pub struct StripeClient {
	http_client: Client,
	base_url: String,
	secret_key: SecretString,
	retry_config: RetryConfig,
}

impl StripeClient {
	pub fn new(secret_key: SecretString) -> Self {
		let http_client = founderdex_common_http::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.expect("Failed to create HTTP client");

		Self {
			http_client,
			base_url: DEFAULT_API_BASE.to_string(),
			secret_key,
			retry_config: RetryConfig::default(),
		}
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into().trim_end_matches('/').to_string();
		self
	}

	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	fn url(&self, path: &str) -> String {
		format!("{}/v1{}", self.base_url, path)
	}

	fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
		request.bearer_auth(self.secret_key.expose())
	}

	async fn send(&self, request: RequestBuilder) -> Result<Response, StripeError> {
		request.send().await.map_err(|e| {
			if e.is_timeout() {
				error!("Request to Stripe timed out");
				return StripeError::Timeout;
			}
			error!(error = %e, "Network error during Stripe request");
			StripeError::Network(e)
		})
	}

	async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, StripeError> {
		let status = response.status();

		if status == StatusCode::UNAUTHORIZED {
			error!("Stripe rejected the secret key");
			return Err(StripeError::Unauthorized);
		}
		if status == StatusCode::TOO_MANY_REQUESTS {
			warn!("Stripe rate limit exceeded");
			return Err(StripeError::RateLimited);
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let (message, param) = ErrorEnvelope::parse(&body);
			return Err(match status {
				StatusCode::BAD_REQUEST => {
					warn!(message = %message, param = ?param, "Stripe rejected request");
					StripeError::InvalidRequest { message, param }
				}
				StatusCode::NOT_FOUND => {
					debug!(message = %message, "Stripe object not found");
					StripeError::NotFound(message)
				}
				_ => {
					error!(status = status.as_u16(), message = %message, "Stripe API error");
					StripeError::ApiError {
						status: status.as_u16(),
						message,
					}
				}
			});
		}

		let body = response.text().await.map_err(StripeError::Network)?;
		serde_json::from_str(&body).map_err(|e| {
			error!(error = %e, "Failed to parse Stripe response");
			StripeError::InvalidResponse(format!("JSON parse error: {e}"))
		})
	}

	/// Create a checkout session and return its hosted URL.
	///
	/// Retries reuse one idempotency key so a timed-out attempt that did land
	/// is not duplicated.
	#[instrument(skip(self, params), fields(mode = %params.mode), name = "StripeClient::create_checkout_session")]
	pub async fn create_checkout_session(
		&self,
		params: &CheckoutSessionParams,
	) -> Result<String, StripeError> {
		let idempotency_key = uuid::Uuid::new_v4().to_string();
		let fields = params.form_fields();

		let session = retry(&self.retry_config, || {
			self.create_checkout_session_inner(&fields, &idempotency_key)
		})
		.await?;

		let url = session.url.ok_or_else(|| {
			error!(session_id = %session.id, "checkout session has no url");
			StripeError::InvalidResponse("checkout session has no url".to_string())
		})?;
		debug!(session_id = %session.id, "checkout session created");
		Ok(url)
	}

	async fn create_checkout_session_inner(
		&self,
		fields: &[(String, String)],
		idempotency_key: &str,
	) -> Result<CheckoutSession, StripeError> {
		let request = self
			.authorized(self.http_client.post(self.url("/checkout/sessions")))
			.header("Idempotency-Key", idempotency_key)
			.form(fields);
		let response = self.send(request).await?;
		Self::handle_response(response).await
	}

	#[instrument(skip(self), name = "StripeClient::retrieve_checkout_session")]
	pub async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, StripeError> {
		self.get(&format!("/checkout/sessions/{id}"), &[("expand[]", "line_items")])
			.await
	}

	#[instrument(skip(self), name = "StripeClient::retrieve_customer")]
	pub async fn retrieve_customer(&self, id: &str) -> Result<Customer, StripeError> {
		self.get(&format!("/customers/{id}"), &[]).await
	}

	#[instrument(skip(self), name = "StripeClient::retrieve_subscription")]
	pub async fn retrieve_subscription(&self, id: &str) -> Result<Subscription, StripeError> {
		self.get(&format!("/subscriptions/{id}"), &[]).await
	}

	async fn get<T: DeserializeOwned>(
		&self,
		path: &str,
		query: &[(&str, &str)],
	) -> Result<T, StripeError> {
		retry(&self.retry_config, || self.get_inner(path, query)).await
	}

	async fn get_inner<T: DeserializeOwned>(
		&self,
		path: &str,
		query: &[(&str, &str)],
	) -> Result<T, StripeError> {
		let request = self
			.authorized(self.http_client.get(self.url(path)))
			.query(query);
		let response = self.send(request).await?;
		Self::handle_response(response).await
	}
}

#[async_trait]
impl PaymentProvider for StripeClient {
	async fn create_checkout_session(
		&self,
		params: &CheckoutSessionParams,
	) -> Result<String, StripeError> {
		self.create_checkout_session(params).await
	}

	async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, StripeError> {
		self.retrieve_checkout_session(id).await
	}

	async fn retrieve_customer(&self, id: &str) -> Result<Customer, StripeError> {
		self.retrieve_customer(id).await
	}

	async fn retrieve_subscription(&self, id: &str) -> Result<Subscription, StripeError> {
		self.retrieve_subscription(id).await
	}
}
