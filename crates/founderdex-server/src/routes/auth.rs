// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-in callback, current user and sign-out.

use axum::{
	extract::{Query, State},
	http::{header::SET_COOKIE, HeaderMap, StatusCode},
	response::{IntoResponse, Redirect, Response},
	Json,
};
use founderdex_server_api::{AuthCallbackQuery, AuthUser, AuthUserResponse};
use founderdex_server_auth_supabase::Identity;

use crate::{
	api::AppState,
	session::{self, current_identity, expired_cookie, session_cookie, CODE_VERIFIER_SUFFIX},
};

fn redirect_target(state: &AppState, has_access: bool) -> String {
	let base_url = state.config.http.base_url.trim_end_matches('/');
	if has_access {
		format!("{base_url}/")
	} else {
		format!("{base_url}/checkout")
	}
}

#[utoipa::path(
    get,
    path = "/auth/callback",
    params(AuthCallbackQuery),
    responses(
        (status = 307, description = "Redirect to the home page when the user has access, else to checkout")
    ),
    tag = "auth"
)]
/// GET /auth/callback - Finish sign-in and route the user by access.
pub async fn callback(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<AuthCallbackQuery>,
) -> Response {
	let checkout = Redirect::temporary(&redirect_target(&state, false)).into_response();

	let (Some(identity), Some(code)) = (state.identity.as_ref(), query.code.as_deref()) else {
		return checkout;
	};

	let auth = &state.config.auth;
	let verifier = session::code_verifier(&headers, auth);
	let session = match identity
		.exchange_code_for_session(code, verifier.as_deref())
		.await
	{
		Ok(session) => session,
		Err(e) => {
			tracing::warn!(error = %e, "auth code exchange failed");
			return checkout;
		}
	};

	let has_access = match state
		.profiles
		.ensure_profile(&session.user.id, session.user.email.as_deref())
		.await
	{
		Ok(profile) => profile.has_access,
		Err(e) => {
			tracing::error!(user_id = %session.user.id, error = %e, "failed to ensure profile");
			false
		}
	};
	tracing::info!(user_id = %session.user.id, has_access, "user signed in");

	let mut response = Redirect::temporary(&redirect_target(&state, has_access)).into_response();
	let cookies = response.headers_mut();
	if let Some(cookie) = session_cookie(auth, session.access_token.expose(), session.expires_in) {
		cookies.append(SET_COOKIE, cookie);
	}
	if verifier.is_some() {
		let name = format!("{}{CODE_VERIFIER_SUFFIX}", auth.session_cookie_name);
		if let Some(cookie) = expired_cookie(auth, &name) {
			cookies.append(SET_COOKIE, cookie);
		}
	}
	response
}

fn auth_user(identity: Identity) -> AuthUser {
	AuthUser {
		id: identity.id,
		email: identity.email,
		created_at: identity.created_at,
	}
}

#[utoipa::path(
    get,
    path = "/auth/user",
    responses(
        (status = 200, description = "The signed-in user and their access, or a null user", body = AuthUserResponse)
    ),
    tag = "auth"
)]
/// GET /auth/user - Current user and whether they have paid access.
pub async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthUserResponse> {
	let Some(identity) =
		current_identity(&headers, &state.config.auth, state.identity.as_deref()).await
	else {
		return Json(AuthUserResponse::signed_out());
	};

	let has_access = match state.profiles.get_profile(&identity.id).await {
		Ok(profile) => profile.is_some_and(|p| p.has_access),
		Err(e) => {
			tracing::error!(user_id = %identity.id, error = %e, "failed to load profile");
			false
		}
	};

	Json(AuthUserResponse {
		user: Some(auth_user(identity)),
		has_access,
	})
}

#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 204, description = "Signed out and session cookie cleared")
    ),
    tag = "auth"
)]
/// POST /auth/signout - Revoke the session and clear the cookie.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let auth = &state.config.auth;
	if let (Some(identity), Some(token)) =
		(state.identity.as_ref(), session::session_token(&headers, auth))
	{
		if let Err(e) = identity.sign_out(&token).await {
			tracing::warn!(error = %e, "session revocation failed");
		}
	}

	let mut response = StatusCode::NO_CONTENT.into_response();
	if let Some(cookie) = expired_cookie(auth, &auth.session_cookie_name) {
		response.headers_mut().insert(SET_COOKIE, cookie);
	}
	response
}
