// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::AuthError;
use crate::types::{Identity, Session};

/// The identity provider as seen by the server.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
	/// Trade an auth callback code for a session.
	async fn exchange_code_for_session(
		&self,
		code: &str,
		code_verifier: Option<&str>,
	) -> Result<Session, AuthError>;

	/// Resolve an access token. `Ok(None)` when the token is not valid.
	async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError>;

	/// Create a confirmed user for `email` with admin credentials.
	async fn admin_create_user(&self, email: &str) -> Result<Identity, AuthError>;

	/// Revoke the session behind `access_token`.
	async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
