// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    analytics::{self, UserAnalytics},
    error::ApiError,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/analytics/users",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    responses((status = 200, body = UserAnalytics))
)]
pub async fn user_analytics(State(state): State<AppState>) -> Result<Json<UserAnalytics>, ApiError> {
    let created = state.users.created_at_all()?;
    Ok(Json(analytics::user_analytics(&created, Utc::now())))
}
