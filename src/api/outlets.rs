// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::ApiError,
    models::{OutletListResponse, OutletRequest, OutletSearchQuery},
    state::AppState,
    storage::{OutletStats, StoredOutlet},
};

#[utoipa::path(
    get,
    path = "/v1/outlets",
    params(OutletSearchQuery),
    tag = "Outlets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = OutletListResponse))
)]
pub async fn list_outlets(
    State(state): State<AppState>,
    Query(query): Query<OutletSearchQuery>,
) -> Result<Json<OutletListResponse>, ApiError> {
    let outlets = state.outlets.list(query.search.as_deref())?;
    Ok(Json(OutletListResponse {
        total: outlets.len(),
        outlets,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/outlets/stats",
    tag = "Outlets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = OutletStats))
)]
pub async fn outlet_stats(State(state): State<AppState>) -> Result<Json<OutletStats>, ApiError> {
    Ok(Json(state.outlets.stats()?))
}

#[utoipa::path(
    post,
    path = "/v1/outlets",
    request_body = OutletRequest,
    tag = "Outlets",
    security(("bearer_auth" = [])),
    responses((status = 201, body = StoredOutlet), (status = 400))
)]
pub async fn create_outlet(
    State(state): State<AppState>,
    Json(request): Json<OutletRequest>,
) -> Result<(StatusCode, Json<StoredOutlet>), ApiError> {
    let new = request.validate().map_err(ApiError::bad_request)?;
    let outlet = state.outlets.create(new)?;
    Ok((StatusCode::CREATED, Json(outlet)))
}

#[utoipa::path(
    get,
    path = "/v1/outlets/{outlet_id}",
    params(("outlet_id" = u64, Path, description = "Outlet id")),
    tag = "Outlets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = StoredOutlet), (status = 404))
)]
pub async fn get_outlet(
    State(state): State<AppState>,
    Path(outlet_id): Path<u64>,
) -> Result<Json<StoredOutlet>, ApiError> {
    Ok(Json(state.outlets.get(outlet_id)?))
}

/// Full replace of an outlet's fields.
#[utoipa::path(
    put,
    path = "/v1/outlets/{outlet_id}",
    params(("outlet_id" = u64, Path, description = "Outlet id")),
    request_body = OutletRequest,
    tag = "Outlets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = StoredOutlet), (status = 400), (status = 404))
)]
pub async fn update_outlet(
    State(state): State<AppState>,
    Path(outlet_id): Path<u64>,
    Json(request): Json<OutletRequest>,
) -> Result<Json<StoredOutlet>, ApiError> {
    let fields = request.validate().map_err(ApiError::bad_request)?;
    let existing = state.outlets.get(outlet_id)?;

    let updated = state.outlets.update(&StoredOutlet {
        name: fields.name,
        address: fields.address,
        phone: fields.phone,
        manager: fields.manager,
        status: fields.status,
        open_hours: fields.open_hours,
        ..existing
    })?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/v1/outlets/{outlet_id}",
    params(("outlet_id" = u64, Path, description = "Outlet id")),
    tag = "Outlets",
    security(("bearer_auth" = [])),
    responses((status = 204), (status = 404))
)]
pub async fn delete_outlet(
    State(state): State<AppState>,
    Path(outlet_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.outlets.delete(outlet_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use crate::storage::OutletStatus;

    fn request(name: &str) -> OutletRequest {
        OutletRequest {
            name: name.into(),
            address: "12 Harbour Road, Portside".into(),
            phone: "0123456789".into(),
            manager: "Dana Reyes".into(),
            status: "active".into(),
            open_hours: "Mon-Fri 08:00-17:00".into(),
        }
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let (state, _dir) = test_state();
        let (status, Json(created)) = create_outlet(State(state.clone()), Json(request("North Depot")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(fetched) = get_outlet(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(fetched, created);

        let mut change = request("North Depot East");
        change.status = "inactive".into();
        let Json(updated) = update_outlet(State(state.clone()), Path(created.id), Json(change))
            .await
            .unwrap();
        assert_eq!(updated.name, "North Depot East");
        assert_eq!(updated.status, OutletStatus::Inactive);
        assert_eq!(updated.created_at, created.created_at);

        let status = delete_outlet(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let err = get_outlet(State(state), Path(created.id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_outlet_is_rejected_before_storage() {
        let (state, _dir) = test_state();
        let mut bad = request("North Depot");
        bad.status = "open".into();

        let err = create_outlet(State(state.clone()), Json(bad)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(state.outlets.list(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_filters_list() {
        let (state, _dir) = test_state();
        create_outlet(State(state.clone()), Json(request("North Depot"))).await.unwrap();
        create_outlet(State(state.clone()), Json(request("South Kiosk"))).await.unwrap();

        let Json(found) = list_outlets(
            State(state),
            Query(OutletSearchQuery {
                search: Some("kiosk".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.outlets[0].name, "South Kiosk");
    }

    #[tokio::test]
    async fn stats_follow_status_changes() {
        let (state, _dir) = test_state();
        let (_, Json(north)) = create_outlet(State(state.clone()), Json(request("North Depot")))
            .await
            .unwrap();
        create_outlet(State(state.clone()), Json(request("South Kiosk"))).await.unwrap();

        let mut closing = request("North Depot");
        closing.status = "inactive".into();
        update_outlet(State(state.clone()), Path(north.id), Json(closing))
            .await
            .unwrap();

        let Json(stats) = outlet_stats(State(state)).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.inactive, 1);
    }
}
