// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
	/// The collaborator is not configured.
	Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComponentHealth {
	pub status: HealthStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub latency_ms: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl ComponentHealth {
	pub fn healthy() -> Self {
		Self {
			status: HealthStatus::Healthy,
			latency_ms: None,
			error: None,
		}
	}

	pub fn not_configured() -> Self {
		Self {
			status: HealthStatus::Unknown,
			latency_ms: None,
			error: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthComponents {
	pub database: ComponentHealth,
	pub auth: ComponentHealth,
	pub payments: ComponentHealth,
	pub webhooks: ComponentHealth,
}

impl HealthComponents {
	/// The database decides overall health. Unconfigured collaborators only
	/// degrade it.
	pub fn aggregate_status(&self) -> HealthStatus {
		if self.database.status != HealthStatus::Healthy {
			return HealthStatus::Unhealthy;
		}
		let optional = [&self.auth, &self.payments, &self.webhooks];
		if optional
			.iter()
			.all(|c| c.status == HealthStatus::Healthy)
		{
			HealthStatus::Healthy
		} else {
			HealthStatus::Degraded
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub duration_ms: u64,
	pub version: String,
	pub components: HealthComponents,
}
