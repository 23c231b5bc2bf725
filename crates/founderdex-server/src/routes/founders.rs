// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Founders listing and search.

use axum::{
	extract::{Query, State},
	http::{HeaderMap, StatusCode, Uri},
	response::{IntoResponse, Response},
	Json,
};
use founderdex_search_core::PageRequest;
use founderdex_server_api::{ErrorResponse, FounderResult, FoundersQuery, FoundersResponse};

use crate::{api::AppState, api_response::forbidden, origin::check_origin};

#[utoipa::path(
    get,
    path = "/founders",
    params(FoundersQuery),
    responses(
        (status = 200, description = "A page of founders, newest first", body = FoundersResponse),
        (status = 403, description = "Request did not come from the site", body = ErrorResponse),
        (status = 500, description = "Search failed", body = FoundersResponse)
    ),
    tag = "founders"
)]
/// GET /founders - Search founders with `+`-separated AND terms.
pub async fn list_founders(
	State(state): State<AppState>,
	headers: HeaderMap,
	uri: Uri,
	Query(query): Query<FoundersQuery>,
) -> Response {
	if let Err(rejection) = check_origin(&headers, uri.path(), &state.config.http, &state.config.search)
	{
		tracing::debug!(?rejection, "founders request refused");
		return forbidden::<ErrorResponse>("forbidden", rejection.message()).into_response();
	}

	let page = PageRequest::from_query(
		query.page.as_deref(),
		query.page_size.as_deref(),
		state.config.search.default_page_size,
		state.config.search.max_page_size,
	);
	let search = query.search.as_deref().unwrap_or_default();

	match state.search.search(search, page).await {
		Ok(result) => {
			let terms = result.terms;
			let founders = result
				.page
				.items
				.into_iter()
				.map(|founder| FounderResult::new(founder, &terms))
				.collect();
			Json(FoundersResponse {
				founders,
				total_count: result.page.total_count,
				error: None,
			})
			.into_response()
		}
		Err(e) => {
			tracing::error!(error = %e, "founders search failed");
			(StatusCode::INTERNAL_SERVER_ERROR, Json(FoundersResponse::failed())).into_response()
		}
	}
}
