// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Founderdex HTTP server.
//!
//! Serves the founders search listing, the checkout and payment webhook
//! endpoints, and the sign-in callback for the identity provider, over a
//! SQLite database.

pub mod api;
pub mod api_docs;
pub mod api_response;
pub mod error;
pub mod origin;
pub mod routes;
pub mod seed;
pub mod session;

pub use api::{create_app_state, create_app_state_with_providers, create_router, AppState, Providers};
pub use api_docs::ApiDoc;
pub use error::ServerError;
pub use founderdex_server_config::ServerConfig;
