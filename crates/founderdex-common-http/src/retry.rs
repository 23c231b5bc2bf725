// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for transient HTTP failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

/// Errors that can tell whether another attempt might succeed.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		match self.status() {
			Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
			None => self.is_request(),
		}
	}
}

/// Backoff settings for [`retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts including the first one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	/// Adds up to 25% random jitter to every delay.
	pub jitter: bool,
	/// Statuses a caller treats as retryable when mapping responses to errors.
	pub retryable_statuses: Vec<StatusCode>,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
			retryable_statuses: vec![
				StatusCode::TOO_MANY_REQUESTS,
				StatusCode::BAD_GATEWAY,
				StatusCode::SERVICE_UNAVAILABLE,
				StatusCode::GATEWAY_TIMEOUT,
			],
		}
	}
}

impl RetryConfig {
	/// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		let exp = self
			.backoff_factor
			.powi(attempt.saturating_sub(1) as i32);
		let max_nanos = self.max_delay.as_nanos() as f64;
		let capped = (self.base_delay.as_nanos() as f64 * exp).min(max_nanos);
		let with_jitter = if self.jitter {
			(capped + capped * 0.25 * fastrand::f64()).min(max_nanos)
		} else {
			capped
		};
		Duration::from_nanos(with_jitter as u64)
	}

	pub fn is_retryable_status(&self, status: StatusCode) -> bool {
		self.retryable_statuses.contains(&status)
	}
}

/// Run `operation` until it succeeds, returns a non-retryable error, or
/// `max_attempts` is exhausted. The last error is returned.
pub async fn retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + Display,
{
	let max_attempts = config.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match operation().await {
			Ok(value) => {
				if attempt > 1 {
					debug!(attempt, "request succeeded after retry");
				}
				return Ok(value);
			}
			Err(e) if attempt < max_attempts && e.is_retryable() => {
				let delay = config.delay_for(attempt);
				warn!(
					attempt,
					max_attempts,
					delay_ms = delay.as_millis() as u64,
					error = %e,
					"retryable error, backing off"
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(e) => return Err(e),
		}
	}
}
