// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod auth;
mod database;
mod http;
mod logging;
mod payments;
mod search;

pub use auth::{AuthConfig, AuthConfigLayer, DEFAULT_SESSION_COOKIE_NAME};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer, DEV_ORIGINS};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use payments::{PaymentsConfig, PaymentsConfigLayer};
pub use search::{SearchConfig, SearchConfigLayer};
