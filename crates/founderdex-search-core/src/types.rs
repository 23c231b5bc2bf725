// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Founder directory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(pub Uuid);

		impl $name {
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}
	};
}

uuid_id!(
	/// Identifier of a founder profile.
	FounderId
);
uuid_id!(
	/// Identifier of an education entry.
	EducationId
);
uuid_id!(
	/// Identifier of an experience entry.
	ExperienceId
);

/// A school attended by a founder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EducationRecord {
	pub id: EducationId,
	pub school: String,
	pub degree: Option<String>,
}

/// A company a founder worked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExperienceRecord {
	pub id: ExperienceId,
	pub company: String,
	pub title: Option<String>,
}

/// A founder with their education and experience, in storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FounderProfile {
	pub id: FounderId,
	pub founder_name: String,
	pub company_name: String,
	pub yc_batch: Option<String>,
	pub linkedin_url: Option<String>,
	pub yc_url: Option<String>,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub founder_education: Vec<EducationRecord>,
	#[serde(default)]
	pub founder_experience: Vec<ExperienceRecord>,
}
