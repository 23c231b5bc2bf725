// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod auth;
pub mod checkout;
pub mod error;
pub mod founders;
pub mod health;

pub use auth::{AuthCallbackQuery, AuthUser, AuthUserResponse};
pub use checkout::{CheckoutRequest, CheckoutResponse};
pub use error::{ErrorResponse, WebhookAck};
pub use founders::{FounderResult, FoundersQuery, FoundersResponse, FOUNDERS_LOAD_FAILED};
pub use health::{ComponentHealth, HealthComponents, HealthResponse, HealthStatus};
