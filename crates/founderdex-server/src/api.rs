// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use founderdex_server_auth_supabase::{IdentityProvider, SupabaseAuthClient};
use founderdex_server_billing::{CheckoutService, WebhookProcessor};
use founderdex_server_billing_stripe::{PaymentProvider, StripeClient};
use founderdex_server_config::ServerConfig;
use founderdex_server_db::{
	FounderRepository, FounderSearchService, PaymentEventRepository, ProfileRepository,
	ProfileStore, SqlitePool,
};
use utoipa::OpenApi;

use crate::{api_docs::ApiDoc, routes};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub config: Arc<ServerConfig>,
	pub search: FounderSearchService,
	pub profiles: Arc<dyn ProfileStore>,
	pub identity: Option<Arc<dyn IdentityProvider>>,
	pub checkout: Option<Arc<CheckoutService>>,
	pub webhook: Option<Arc<WebhookProcessor>>,
}

/// External collaborators the server talks to. Either may be absent when
/// its configuration is missing.
#[derive(Clone, Default)]
pub struct Providers {
	pub identity: Option<Arc<dyn IdentityProvider>>,
	pub payments: Option<Arc<dyn PaymentProvider>>,
}

impl Providers {
	/// Build the Supabase and Stripe clients from configuration.
	pub fn from_config(config: &ServerConfig) -> Self {
		let identity = match (&config.auth.supabase_url, &config.auth.supabase_anon_key) {
			(Some(url), Some(anon_key)) => {
				let mut client = SupabaseAuthClient::new(url.clone(), anon_key.clone());
				if let Some(service_role_key) = &config.auth.supabase_service_role_key {
					client = client.with_service_role_key(service_role_key.clone());
				}
				Some(Arc::new(client) as Arc<dyn IdentityProvider>)
			}
			_ => {
				tracing::warn!("Supabase is not configured, sign-in is disabled");
				None
			}
		};

		let payments = match &config.payments.stripe_secret_key {
			Some(secret_key) => {
				let client =
					StripeClient::new(secret_key.clone()).with_base_url(config.payments.api_base.clone());
				Some(Arc::new(client) as Arc<dyn PaymentProvider>)
			}
			None => {
				tracing::warn!("Stripe is not configured, checkout and webhooks are disabled");
				None
			}
		};

		Self { identity, payments }
	}
}

pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	create_app_state_with_providers(pool, config, Providers::from_config(config))
}

/// Build state around the given collaborators instead of the configured clients.
pub fn create_app_state_with_providers(
	pool: SqlitePool,
	config: &ServerConfig,
	providers: Providers,
) -> AppState {
	let founders = Arc::new(FounderRepository::new(pool.clone()));
	let profiles: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(pool.clone()));

	let checkout = providers
		.payments
		.as_ref()
		.map(|payments| Arc::new(CheckoutService::new(profiles.clone(), payments.clone())));

	let webhook = match (&providers.payments, &providers.identity) {
		(Some(payments), Some(identity)) if config.payments.webhooks_enabled() => {
			let mut processor = WebhookProcessor::new(
				profiles.clone(),
				payments.clone(),
				identity.clone(),
				config.payments.price_id.clone(),
			);
			if config.payments.event_ledger {
				processor =
					processor.with_event_ledger(Arc::new(PaymentEventRepository::new(pool.clone())));
			}
			Some(Arc::new(processor))
		}
		_ => None,
	};

	if config.payments.webhooks_enabled() && webhook.is_none() {
		tracing::warn!("webhook secret is set but Stripe or Supabase is missing, webhooks are disabled");
	}

	AppState {
		pool,
		config: Arc::new(config.clone()),
		search: FounderSearchService::new(founders),
		profiles,
		identity: providers.identity,
		checkout,
		webhook,
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/founders", get(routes::founders::list_founders))
		.route("/checkout", post(routes::checkout::create_checkout))
		.route("/webhook", post(routes::webhook::stripe_webhook))
		.route("/auth/callback", get(routes::auth::callback))
		.route("/auth/user", get(routes::auth::current_user))
		.route("/auth/signout", post(routes::auth::sign_out))
		.route("/api/openapi.json", get(openapi_json))
		.with_state(state)
}

async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
	axum::Json(ApiDoc::openapi())
}
