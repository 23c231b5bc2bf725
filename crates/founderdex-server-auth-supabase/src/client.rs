// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supabase Auth (GoTrue) REST client.

use std::time::Duration;

use async_trait::async_trait;
use founderdex_common_http::{retry, RetryConfig};
use founderdex_common_secret::SecretString;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use crate::error::AuthError;
use crate::provider::IdentityProvider;
use crate::types::{AdminCreateUserRequest, ErrorBody, Identity, PkceExchangeRequest, Session};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SupabaseAuthClient {
	http_client: Client,
	base_url: String,
	anon_key: SecretString,
	service_role_key: Option<SecretString>,
	retry_config: RetryConfig,
}

impl SupabaseAuthClient {
	/// Create a client for the project at `base_url` (e.g. `https://xyz.supabase.co`).
	pub fn new(base_url: impl Into<String>, anon_key: SecretString) -> Self {
		let http_client = founderdex_common_http::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.expect("Failed to create HTTP client");

		Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			anon_key,
			service_role_key: None,
			retry_config: RetryConfig::default(),
		}
	}

	/// Enables admin calls.
	pub fn with_service_role_key(mut self, key: SecretString) -> Self {
		self.service_role_key = Some(key);
		self
	}

	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	fn url(&self, path: &str) -> String {
		format!("{}/auth/v1{}", self.base_url, path)
	}

	fn with_anon_key(&self, request: RequestBuilder) -> RequestBuilder {
		request.header("apikey", self.anon_key.expose().as_str())
	}

	async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
		request.send().await.map_err(|e| {
			if e.is_timeout() {
				error!("Request to Supabase timed out");
				return AuthError::Timeout;
			}
			error!(error = %e, "Network error during Supabase request");
			AuthError::Network(e)
		})
	}

	async fn error_for_status(response: Response) -> AuthError {
		let status = response.status();
		let body = response.text().await.unwrap_or_default();
		let message = ErrorBody::parse(&body);
		error!(status = status.as_u16(), message = %message, "Supabase API error");
		AuthError::ApiError {
			status: status.as_u16(),
			message,
		}
	}

	async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
		let body = response.text().await.map_err(AuthError::Network)?;
		serde_json::from_str(&body).map_err(|e| {
			error!(error = %e, "Failed to parse Supabase response");
			AuthError::InvalidResponse(format!("JSON parse error: {e}"))
		})
	}

	#[instrument(skip(self, code, code_verifier), name = "SupabaseAuthClient::exchange_code")]
	pub async fn exchange_code(
		&self,
		code: &str,
		code_verifier: Option<&str>,
	) -> Result<Session, AuthError> {
		debug!("exchanging auth code for session");

		let request = self
			.with_anon_key(self.http_client.post(self.url("/token")))
			.query(&[("grant_type", "pkce")])
			.json(&PkceExchangeRequest {
				auth_code: code,
				code_verifier,
			});
		let response = self.send(request).await?;

		let status = response.status();
		if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
			let body = response.text().await.unwrap_or_default();
			let message = ErrorBody::parse(&body);
			warn!(status = status.as_u16(), message = %message, "auth code rejected");
			return Err(AuthError::InvalidCode(message));
		}
		if status == StatusCode::UNAUTHORIZED {
			return Err(AuthError::Unauthorized);
		}
		if !status.is_success() {
			return Err(Self::error_for_status(response).await);
		}

		let session: Session = Self::parse_json(response).await?;
		debug!(user_id = %session.user.id, "auth code exchanged");
		Ok(session)
	}

	#[instrument(skip(self, access_token), name = "SupabaseAuthClient::get_user")]
	pub async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
		retry(&self.retry_config, || self.get_user_inner(access_token)).await
	}

	async fn get_user_inner(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
		let request = self
			.with_anon_key(self.http_client.get(self.url("/user")))
			.bearer_auth(access_token);
		let response = self.send(request).await?;

		let status = response.status();
		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			debug!(status = status.as_u16(), "access token not accepted");
			return Ok(None);
		}
		if !status.is_success() {
			return Err(Self::error_for_status(response).await);
		}

		Self::parse_json(response).await.map(Some)
	}

	#[instrument(skip(self, email), name = "SupabaseAuthClient::admin_create_user")]
	pub async fn admin_create_user(&self, email: &str) -> Result<Identity, AuthError> {
		let service_key = self
			.service_role_key
			.as_ref()
			.ok_or(AuthError::NotConfigured("service role key"))?;

		let request = self
			.http_client
			.post(self.url("/admin/users"))
			.header("apikey", service_key.expose().as_str())
			.bearer_auth(service_key.expose())
			.json(&AdminCreateUserRequest {
				email,
				email_confirm: true,
			});
		let response = self.send(request).await?;

		let status = response.status();
		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			error!(status = status.as_u16(), "service role key rejected");
			return Err(AuthError::Unauthorized);
		}
		if !status.is_success() {
			return Err(Self::error_for_status(response).await);
		}

		let identity: Identity = Self::parse_json(response).await?;
		debug!(user_id = %identity.id, "created user");
		Ok(identity)
	}

	#[instrument(skip(self, access_token), name = "SupabaseAuthClient::sign_out")]
	pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
		let request = self
			.with_anon_key(self.http_client.post(self.url("/logout")))
			.bearer_auth(access_token);
		let response = self.send(request).await?;

		let status = response.status();
		// An already-invalid token has nothing left to revoke.
		if status.is_success() || status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND
		{
			return Ok(());
		}
		Err(Self::error_for_status(response).await)
	}
}

#[async_trait]
impl IdentityProvider for SupabaseAuthClient {
	async fn exchange_code_for_session(
		&self,
		code: &str,
		code_verifier: Option<&str>,
	) -> Result<Session, AuthError> {
		self.exchange_code(code, code_verifier).await
	}

	async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
		self.get_user(access_token).await
	}

	async fn admin_create_user(&self, email: &str) -> Result<Identity, AuthError> {
		self.admin_create_user(email).await
	}

	async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
		self.sign_out(access_token).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use wiremock::matchers::{body_json, header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client(server: &MockServer) -> SupabaseAuthClient {
		SupabaseAuthClient::new(server.uri(), SecretString::new("anon".to_string()))
			.with_retry_config(RetryConfig {
				max_attempts: 1,
				..Default::default()
			})
	}

	#[test]
	fn test_base_url_trailing_slash_trimmed() {
		let client = SupabaseAuthClient::new(
			"https://xyz.supabase.co/",
			SecretString::new("anon".to_string()),
		);
		assert_eq!(client.url("/user"), "https://xyz.supabase.co/auth/v1/user");
	}

	#[test]
	fn test_debug_redacts_keys() {
		let client = SupabaseAuthClient::new(
			"https://xyz.supabase.co",
			SecretString::new("anon-key-value".to_string()),
		)
		.with_service_role_key(SecretString::new("service-key-value".to_string()));
		let debug = format!("{client:?}");
		assert!(!debug.contains("anon-key-value"));
		assert!(!debug.contains("service-key-value"));
	}

	#[tokio::test]
	async fn test_exchange_code_success() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/token"))
			.and(query_param("grant_type", "pkce"))
			.and(header("apikey", "anon"))
			.and(body_json(json!({"auth_code": "code-1", "code_verifier": "verifier"})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"access_token": "at_1",
				"token_type": "bearer",
				"expires_in": 3600,
				"user": {"id": "user-1", "email": "ada@example.com"}
			})))
			.mount(&server)
			.await;

		let session = client(&server)
			.exchange_code("code-1", Some("verifier"))
			.await
			.unwrap();
		assert_eq!(session.access_token.expose(), "at_1");
		assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
	}

	#[tokio::test]
	async fn test_exchange_code_rejected() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/token"))
			.respond_with(ResponseTemplate::new(400).set_body_json(json!({
				"error": "invalid_grant",
				"error_description": "auth code expired"
			})))
			.mount(&server)
			.await;

		let result = client(&server).exchange_code("stale", None).await;
		match result {
			Err(AuthError::InvalidCode(message)) => assert_eq!(message, "auth code expired"),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_get_user_valid_and_invalid_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/user"))
			.and(header("authorization", "Bearer good"))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(json!({"id": "user-1", "email": "a@b.c"})),
			)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/user"))
			.and(header("authorization", "Bearer bad"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let client = client(&server);
		let user = client.get_user("good").await.unwrap().unwrap();
		assert_eq!(user.id, "user-1");
		assert!(client.get_user("bad").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_admin_create_user_requires_service_key() {
		let server = MockServer::start().await;
		let result = client(&server).admin_create_user("a@b.c").await;
		assert!(matches!(result, Err(AuthError::NotConfigured(_))));
	}

	#[tokio::test]
	async fn test_admin_create_user() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/admin/users"))
			.and(header("authorization", "Bearer service"))
			.and(body_json(json!({"email": "payer@example.com", "email_confirm": true})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"id": "user-9",
				"email": "payer@example.com"
			})))
			.mount(&server)
			.await;

		let identity = client(&server)
			.with_service_role_key(SecretString::new("service".to_string()))
			.admin_create_user("payer@example.com")
			.await
			.unwrap();
		assert_eq!(identity.id, "user-9");
	}

	#[tokio::test]
	async fn test_sign_out_tolerates_expired_token() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/auth/v1/logout"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		assert!(client(&server).sign_out("expired").await.is_ok());
	}

	#[tokio::test]
	async fn test_server_error_surfaces_status() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/auth/v1/user"))
			.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
			.mount(&server)
			.await;

		let result = client(&server).get_user("token").await;
		assert!(matches!(result, Err(AuthError::ApiError { status: 500, .. })));
	}
}
