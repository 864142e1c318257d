// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Activity log: the recording middleware and the listing endpoint.

use axum::{
    extract::{OriginalUri, Query, Request, State},
    middleware::Next,
    response::Response,
    Json,
};

use super::client::{client_ip, user_agent};
use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    models::{ActivityListResponse, ActivityQuery},
    state::AppState,
    storage::ActivityEvent,
};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Record every request after its handler ran.
///
/// The user id comes from the response extensions, where `require_auth`
/// leaves it. A failed write is logged and the response is returned as is.
pub async fn record_activity(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path().to_string(), |uri| uri.path().to_string());
    let query = request.uri().query().map(str::to_string);
    let ip = client_ip(request.headers(), request.extensions());
    let agent = user_agent(request.headers());

    let response = next.run(request).await;

    let mut event = ActivityEvent::new(method, endpoint, response.status().as_u16());
    if let Some(user) = response.extensions().get::<AuthenticatedUser>() {
        event = event.with_user(&user.user_id);
    }
    if let Some(query) = query {
        event = event.with_query(query);
    }
    if let Some(ip) = ip {
        event = event.with_ip(ip);
    }
    if let Some(agent) = agent {
        event = event.with_user_agent(agent);
    }

    if let Err(e) = state.activity.record(&event) {
        tracing::warn!(error = %e, endpoint = %event.endpoint, "Failed to record activity");
    }
    response
}

#[utoipa::path(
    get,
    path = "/v1/activity",
    params(ActivityQuery),
    tag = "Activity",
    security(("bearer_auth" = [])),
    responses((status = 200, body = ActivityListResponse))
)]
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let events = state.activity.recent(limit, query.user_id.as_deref())?;
    Ok(Json(ActivityListResponse { events }))
}
