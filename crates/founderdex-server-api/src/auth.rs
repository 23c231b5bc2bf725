// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct AuthCallbackQuery {
	/// Authorization code issued by the identity provider.
	#[serde(default)]
	pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthUser {
	pub id: String,
	pub email: Option<String>,
	pub created_at: Option<String>,
}

/// Current session state. `user` is `null` when signed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthUserResponse {
	pub user: Option<AuthUser>,
	pub has_access: bool,
}

impl AuthUserResponse {
	pub fn signed_out() -> Self {
		Self {
			user: None,
			has_access: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_signed_out_shape() {
		let json = serde_json::to_value(AuthUserResponse::signed_out()).unwrap();
		assert_eq!(json, serde_json::json!({"user": null, "hasAccess": false}));
	}
}
