// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use founderdex_server_api::{ComponentHealth, HealthComponents, HealthResponse, HealthStatus};
use founderdex_server_db::{ping, SqlitePool};
use tokio::time::Instant;

use crate::api::AppState;

async fn check_database(pool: &SqlitePool) -> ComponentHealth {
	let start = Instant::now();
	match ping(pool).await {
		Ok(()) => ComponentHealth {
			status: HealthStatus::Healthy,
			latency_ms: Some(start.elapsed().as_millis() as u64),
			error: None,
		},
		Err(e) => ComponentHealth {
			status: HealthStatus::Unhealthy,
			latency_ms: Some(start.elapsed().as_millis() as u64),
			error: Some(e.to_string()),
		},
	}
}

fn configured(is_configured: bool) -> ComponentHealth {
	if is_configured {
		ComponentHealth::healthy()
	} else {
		ComponentHealth::not_configured()
	}
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy or degraded", body = HealthResponse),
        (status = 503, description = "System is unhealthy", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Database reachability and configured collaborators.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let overall_start = Instant::now();

	let components = HealthComponents {
		database: check_database(&state.pool).await,
		auth: configured(state.identity.is_some()),
		payments: configured(state.checkout.is_some()),
		webhooks: configured(state.webhook.is_some()),
	};

	let status = components.aggregate_status();
	let response = HealthResponse {
		status,
		timestamp: chrono::Utc::now().to_rfc3339(),
		duration_ms: overall_start.elapsed().as_millis() as u64,
		version: env!("CARGO_PKG_VERSION").to_string(),
		components,
	};

	let http_status = match status {
		HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
		HealthStatus::Unhealthy | HealthStatus::Unknown => StatusCode::SERVICE_UNAVAILABLE,
	};

	(http_status, Json(response))
}
