// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document for the HTTP surface, served at `/api/openapi.json`.

use founderdex_search_core::{
	DisplayEntry, DisplayPlan, EducationRecord, ExperienceRecord, FounderHighlights, FounderProfile,
	MatchField, MatchKind, SearchMatch,
};
use founderdex_server_api::{
	AuthUser, AuthUserResponse, CheckoutRequest, CheckoutResponse, ComponentHealth, ErrorResponse,
	FounderResult, FoundersResponse, HealthComponents, HealthResponse, HealthStatus, WebhookAck,
};
use utoipa::OpenApi;

use crate::routes;

#[derive(OpenApi)]
#[openapi(
	info(title = "Founderdex API", description = "Founders search, sign-in and paid access"),
	paths(
		routes::health::health_check,
		routes::founders::list_founders,
		routes::checkout::create_checkout,
		routes::webhook::stripe_webhook,
		routes::auth::callback,
		routes::auth::current_user,
		routes::auth::sign_out,
	),
	components(schemas(
		AuthUser,
		AuthUserResponse,
		CheckoutRequest,
		CheckoutResponse,
		ComponentHealth,
		DisplayEntry,
		DisplayPlan,
		EducationRecord,
		ErrorResponse,
		ExperienceRecord,
		FounderHighlights,
		FounderProfile,
		FounderResult,
		FoundersResponse,
		HealthComponents,
		HealthResponse,
		HealthStatus,
		MatchField,
		MatchKind,
		SearchMatch,
		WebhookAck,
	)),
	tags(
		(name = "founders", description = "Founders search"),
		(name = "billing", description = "Checkout and payment events"),
		(name = "auth", description = "Sign-in and session"),
		(name = "health", description = "Health checks"),
	)
)]
pub struct ApiDoc;
