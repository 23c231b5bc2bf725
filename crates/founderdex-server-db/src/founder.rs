// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Founder directory repository.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use founderdex_search_core::{
	fold_case, EducationId, EducationRecord, ExperienceId, ExperienceRecord, FounderFilter,
	FounderId, FounderProfile, SearchTerm,
};
use serde::Deserialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::DbError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewEducation {
	pub school: String,
	#[serde(default)]
	pub degree: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExperience {
	pub company: String,
	#[serde(default)]
	pub title: Option<String>,
}

/// A founder to insert. Children keep the order given here.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFounder {
	pub founder_name: String,
	pub company_name: String,
	#[serde(default)]
	pub yc_batch: Option<String>,
	#[serde(default)]
	pub linkedin_url: Option<String>,
	#[serde(default)]
	pub yc_url: Option<String>,
	/// Defaults to now.
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub founder_education: Vec<NewEducation>,
	#[serde(default)]
	pub founder_experience: Vec<NewExperience>,
}

// Fixed-width UTC so `ORDER BY created_at` is chronological.
fn format_timestamp(ts: DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid timestamp '{value}': {e}")))
}

fn parse_id<T: FromStr<Err = uuid::Error>>(value: &str) -> Result<T, DbError> {
	value
		.parse()
		.map_err(|e| DbError::Internal(format!("invalid id '{value}': {e}")))
}

fn ids_json<'a>(ids: impl Iterator<Item = &'a FounderId>) -> Result<String, DbError> {
	let ids: Vec<String> = ids.map(ToString::to_string).collect();
	Ok(serde_json::to_string(&ids)?)
}

fn collect_founder_ids(rows: &[SqliteRow], column: &str) -> Result<HashSet<FounderId>, DbError> {
	rows.iter()
		.map(|row| parse_id(&row.get::<String, _>(column)))
		.collect()
}

#[derive(Clone)]
pub struct FounderRepository {
	pool: SqlitePool,
}

impl FounderRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Founders whose name or company name contains `term`.
	#[tracing::instrument(skip(self, term), fields(term = %term.as_str()))]
	pub async fn ids_matching_profile(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id FROM founder_profiles
			WHERE founder_name_lc LIKE ?1 ESCAPE '\' OR company_name_lc LIKE ?1 ESCAPE '\'
			"#,
		)
		.bind(term.like_pattern())
		.fetch_all(&self.pool)
		.await?;

		collect_founder_ids(&rows, "id")
	}

	/// Founders with an education entry whose school or degree contains `term`.
	#[tracing::instrument(skip(self, term), fields(term = %term.as_str()))]
	pub async fn ids_matching_education(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT DISTINCT founder_id FROM founder_education
			WHERE school_lc LIKE ?1 ESCAPE '\' OR degree_lc LIKE ?1 ESCAPE '\'
			"#,
		)
		.bind(term.like_pattern())
		.fetch_all(&self.pool)
		.await?;

		collect_founder_ids(&rows, "founder_id")
	}

	/// Founders with an experience entry whose company or title contains `term`.
	#[tracing::instrument(skip(self, term), fields(term = %term.as_str()))]
	pub async fn ids_matching_experience(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT DISTINCT founder_id FROM founder_experience
			WHERE company_lc LIKE ?1 ESCAPE '\' OR title_lc LIKE ?1 ESCAPE '\'
			"#,
		)
		.bind(term.like_pattern())
		.fetch_all(&self.pool)
		.await?;

		collect_founder_ids(&rows, "founder_id")
	}

	/// One window of founders, newest first, with the total size of the
	/// filtered set. Equal `created_at` values keep insertion order.
	#[tracing::instrument(skip(self, filter))]
	pub async fn list_founders(
		&self,
		filter: &FounderFilter,
		offset: i64,
		limit: i64,
	) -> Result<(Vec<FounderProfile>, i64), DbError> {
		let (where_clause, filter_json) = match filter {
			FounderFilter::All => ("", None),
			FounderFilter::Ids(ids) => (
				"WHERE id IN (SELECT value FROM json_each(?))",
				Some(ids_json(ids.iter())?),
			),
		};

		let count_sql = format!("SELECT COUNT(*) FROM founder_profiles {where_clause}");
		let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
		if let Some(json) = &filter_json {
			count_query = count_query.bind(json.clone());
		}
		let total = count_query.fetch_one(&self.pool).await?;

		let page_sql = format!(
			r#"
			SELECT id, founder_name, company_name, yc_batch, linkedin_url, yc_url, created_at
			FROM founder_profiles
			{where_clause}
			ORDER BY created_at DESC, rowid ASC
			LIMIT ? OFFSET ?
			"#
		);
		let mut page_query = sqlx::query(&page_sql);
		if let Some(json) = &filter_json {
			page_query = page_query.bind(json.clone());
		}
		let rows = page_query
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;

		let mut founders = rows
			.iter()
			.map(row_to_founder)
			.collect::<Result<Vec<_>, _>>()?;

		if !founders.is_empty() {
			self.attach_children(&mut founders).await?;
		}

		tracing::debug!(count = founders.len(), total, "listed founders");
		Ok((founders, total))
	}

	async fn attach_children(&self, founders: &mut [FounderProfile]) -> Result<(), DbError> {
		let page_ids = ids_json(founders.iter().map(|f| &f.id))?;

		let education_rows = sqlx::query(
			r#"
			SELECT id, founder_id, school, degree FROM founder_education
			WHERE founder_id IN (SELECT value FROM json_each(?1))
			ORDER BY founder_id, position
			"#,
		)
		.bind(&page_ids)
		.fetch_all(&self.pool)
		.await?;

		let experience_rows = sqlx::query(
			r#"
			SELECT id, founder_id, company, title FROM founder_experience
			WHERE founder_id IN (SELECT value FROM json_each(?1))
			ORDER BY founder_id, position
			"#,
		)
		.bind(&page_ids)
		.fetch_all(&self.pool)
		.await?;

		let mut education: HashMap<FounderId, Vec<EducationRecord>> = HashMap::new();
		for row in &education_rows {
			let founder_id: FounderId = parse_id(&row.get::<String, _>("founder_id"))?;
			education.entry(founder_id).or_default().push(EducationRecord {
				id: parse_id::<EducationId>(&row.get::<String, _>("id"))?,
				school: row.get("school"),
				degree: row.get("degree"),
			});
		}

		let mut experience: HashMap<FounderId, Vec<ExperienceRecord>> = HashMap::new();
		for row in &experience_rows {
			let founder_id: FounderId = parse_id(&row.get::<String, _>("founder_id"))?;
			experience.entry(founder_id).or_default().push(ExperienceRecord {
				id: parse_id::<ExperienceId>(&row.get::<String, _>("id"))?,
				company: row.get("company"),
				title: row.get("title"),
			});
		}

		for founder in founders.iter_mut() {
			founder.founder_education = education.remove(&founder.id).unwrap_or_default();
			founder.founder_experience = experience.remove(&founder.id).unwrap_or_default();
		}
		Ok(())
	}

	#[tracing::instrument(skip(self, founder), fields(founder_name = %founder.founder_name))]
	pub async fn insert_founder(&self, founder: NewFounder) -> Result<FounderProfile, DbError> {
		let id = FounderId::new();
		let created_at = founder.created_at.unwrap_or_else(Utc::now);

		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO founder_profiles
				(id, founder_name, company_name, yc_batch, linkedin_url, yc_url, created_at,
				 founder_name_lc, company_name_lc)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
			"#,
		)
		.bind(id.to_string())
		.bind(&founder.founder_name)
		.bind(&founder.company_name)
		.bind(&founder.yc_batch)
		.bind(&founder.linkedin_url)
		.bind(&founder.yc_url)
		.bind(format_timestamp(created_at))
		.bind(fold_case(&founder.founder_name))
		.bind(fold_case(&founder.company_name))
		.execute(&mut *tx)
		.await?;

		let mut founder_education = Vec::with_capacity(founder.founder_education.len());
		for (position, edu) in founder.founder_education.into_iter().enumerate() {
			let edu_id = EducationId::new();
			sqlx::query(
				r#"
				INSERT INTO founder_education
					(id, founder_id, position, school, degree, school_lc, degree_lc)
				VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
				"#,
			)
			.bind(edu_id.to_string())
			.bind(id.to_string())
			.bind(position as i64)
			.bind(&edu.school)
			.bind(&edu.degree)
			.bind(fold_case(&edu.school))
			.bind(edu.degree.as_deref().map(fold_case))
			.execute(&mut *tx)
			.await?;
			founder_education.push(EducationRecord {
				id: edu_id,
				school: edu.school,
				degree: edu.degree,
			});
		}

		let mut founder_experience = Vec::with_capacity(founder.founder_experience.len());
		for (position, exp) in founder.founder_experience.into_iter().enumerate() {
			let exp_id = ExperienceId::new();
			sqlx::query(
				r#"
				INSERT INTO founder_experience
					(id, founder_id, position, company, title, company_lc, title_lc)
				VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
				"#,
			)
			.bind(exp_id.to_string())
			.bind(id.to_string())
			.bind(position as i64)
			.bind(&exp.company)
			.bind(&exp.title)
			.bind(fold_case(&exp.company))
			.bind(exp.title.as_deref().map(fold_case))
			.execute(&mut *tx)
			.await?;
			founder_experience.push(ExperienceRecord {
				id: exp_id,
				company: exp.company,
				title: exp.title,
			});
		}

		tx.commit().await?;
		tracing::debug!(founder_id = %id, "inserted founder");

		Ok(FounderProfile {
			id,
			founder_name: founder.founder_name,
			company_name: founder.company_name,
			yc_batch: founder.yc_batch,
			linkedin_url: founder.linkedin_url,
			yc_url: founder.yc_url,
			created_at,
			founder_education,
			founder_experience,
		})
	}
}

fn row_to_founder(row: &SqliteRow) -> Result<FounderProfile, DbError> {
	Ok(FounderProfile {
		id: parse_id(&row.get::<String, _>("id"))?,
		founder_name: row.get("founder_name"),
		company_name: row.get("company_name"),
		yc_batch: row.get("yc_batch"),
		linkedin_url: row.get("linkedin_url"),
		yc_url: row.get("yc_url"),
		created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
		founder_education: Vec::new(),
		founder_experience: Vec::new(),
	})
}

#[async_trait]
pub trait FounderStore: Send + Sync {
	async fn ids_matching_profile(&self, term: &SearchTerm)
		-> Result<HashSet<FounderId>, DbError>;
	async fn ids_matching_education(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError>;
	async fn ids_matching_experience(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError>;
	async fn list_founders(
		&self,
		filter: &FounderFilter,
		offset: i64,
		limit: i64,
	) -> Result<(Vec<FounderProfile>, i64), DbError>;
	async fn insert_founder(&self, founder: NewFounder) -> Result<FounderProfile, DbError>;
}

#[async_trait]
impl FounderStore for FounderRepository {
	async fn ids_matching_profile(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError> {
		self.ids_matching_profile(term).await
	}

	async fn ids_matching_education(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError> {
		self.ids_matching_education(term).await
	}

	async fn ids_matching_experience(
		&self,
		term: &SearchTerm,
	) -> Result<HashSet<FounderId>, DbError> {
		self.ids_matching_experience(term).await
	}

	async fn list_founders(
		&self,
		filter: &FounderFilter,
		offset: i64,
		limit: i64,
	) -> Result<(Vec<FounderProfile>, i64), DbError> {
		self.list_founders(filter, offset, limit).await
	}

	async fn insert_founder(&self, founder: NewFounder) -> Result<FounderProfile, DbError> {
		self.insert_founder(founder).await
	}
}
