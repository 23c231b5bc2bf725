// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared setup for router tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	body::Body,
	http::{header, Request, Response},
	Router,
};
use chrono::{Duration, Utc};
use founderdex_common_secret::SecretString;
use founderdex_common_webhook::sign_header;
use founderdex_server::{create_app_state_with_providers, create_router, Providers, ServerConfig};
use founderdex_server_auth_supabase::IdentityProvider;
use founderdex_server_billing::testing::{FakeIdentities, FakePayments};
use founderdex_server_billing_stripe::PaymentProvider;
use founderdex_server_db::{
	create_pool, run_migrations, FounderRepository, NewEducation, NewExperience, NewFounder,
	PaymentEventRepository, ProfileRepository, SqlitePool,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SITE: &str = "https://founderdex.test";
pub const PRICE: &str = "price_pro";
pub const WEBHOOK_SECRET: &str = "whsec_test";

pub fn test_config() -> ServerConfig {
	let mut config = ServerConfig::default();
	config.http.base_url = SITE.to_string();
	config.http.allowed_origins = vec![SITE.to_string()];
	config.payments.webhook_secret = Some(SecretString::new(WEBHOOK_SECRET.to_string()));
	config.payments.price_id = Some(PRICE.to_string());
	config
}

pub struct TestApp {
	pub router: Router,
	pub pool: SqlitePool,
	pub payments: Option<Arc<FakePayments>>,
	pub identities: Option<Arc<FakeIdentities>>,
	_dir: TempDir,
}

impl TestApp {
	/// App with default fakes for both collaborators.
	pub async fn new() -> Self {
		Self::build(
			test_config(),
			Some(FakePayments::default()),
			Some(FakeIdentities::default()),
		)
		.await
	}

	/// App with neither Stripe nor Supabase.
	pub async fn unconfigured() -> Self {
		Self::build(test_config(), None, None).await
	}

	pub async fn build(
		config: ServerConfig,
		payments: Option<FakePayments>,
		identities: Option<FakeIdentities>,
	) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let db_url = format!("sqlite:{}?mode=rwc", dir.path().join("test.db").display());
		let pool = create_pool(&db_url).await.unwrap();
		run_migrations(&pool).await.unwrap();

		let payments = payments.map(Arc::new);
		let identities = identities.map(Arc::new);
		let providers = Providers {
			identity: identities
				.clone()
				.map(|i| i as Arc<dyn IdentityProvider>),
			payments: payments.clone().map(|p| p as Arc<dyn PaymentProvider>),
		};
		let state = create_app_state_with_providers(pool.clone(), &config, providers);

		Self {
			router: create_router(state),
			pool,
			payments,
			identities,
			_dir: dir,
		}
	}

	pub async fn request(&self, request: Request<Body>) -> Response<Body> {
		self.router.clone().oneshot(request).await.unwrap()
	}

	pub fn payments(&self) -> &FakePayments {
		self.payments.as_deref().unwrap()
	}

	pub fn identities(&self) -> &FakeIdentities {
		self.identities.as_deref().unwrap()
	}

	pub fn profiles(&self) -> ProfileRepository {
		ProfileRepository::new(self.pool.clone())
	}

	pub fn events(&self) -> PaymentEventRepository {
		PaymentEventRepository::new(self.pool.clone())
	}

	pub fn founders(&self) -> FounderRepository {
		FounderRepository::new(self.pool.clone())
	}
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&body).unwrap()
}

/// GET request as the site's own page would send it.
pub fn site_get(uri: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header(header::REFERER, format!("{SITE}/"))
		.body(Body::empty())
		.unwrap()
}

pub fn with_session(uri: &str, method: &str, token: &str) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header(header::COOKIE, format!("founderdex_session={token}"))
		.body(Body::empty())
		.unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json");
	if let Some(token) = cookie {
		builder = builder.header(header::COOKIE, format!("founderdex_session={token}"));
	}
	builder.body(Body::from(body.to_string())).unwrap()
}

/// A webhook delivery signed with [`WEBHOOK_SECRET`].
pub fn signed_webhook(event: &serde_json::Value) -> Request<Body> {
	let payload = serde_json::to_vec(event).unwrap();
	let signature = sign_header(WEBHOOK_SECRET.as_bytes(), &payload, Utc::now().timestamp());
	Request::builder()
		.method("POST")
		.uri("/webhook")
		.header(header::CONTENT_TYPE, "application/json")
		.header("stripe-signature", signature)
		.body(Body::from(payload))
		.unwrap()
}

pub fn event(id: &str, event_type: &str, created: i64, object: serde_json::Value) -> serde_json::Value {
	serde_json::json!({
		"id": id,
		"type": event_type,
		"created": created,
		"livemode": false,
		"data": {"object": object}
	})
}

/// A founder created `minutes_ago` minutes in the past.
pub fn founder(
	name: &str,
	company: &str,
	minutes_ago: i64,
	education: &[(&str, Option<&str>)],
	experience: &[(&str, Option<&str>)],
) -> NewFounder {
	NewFounder {
		founder_name: name.to_string(),
		company_name: company.to_string(),
		yc_batch: Some("W24".to_string()),
		linkedin_url: None,
		yc_url: None,
		created_at: Some(Utc::now() - Duration::minutes(minutes_ago)),
		founder_education: education
			.iter()
			.map(|(school, degree)| NewEducation {
				school: school.to_string(),
				degree: degree.map(str::to_string),
			})
			.collect(),
		founder_experience: experience
			.iter()
			.map(|(company, title)| NewExperience {
				company: company.to_string(),
				title: title.map(str::to_string),
			})
			.collect(),
	}
}
