// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::{password::hash_password, Auth},
    error::ApiError,
    models::{CreateUserRequest, GroupQuery, UpdateUserRequest, UserResponse, DEFAULT_GROUP},
    state::AppState,
    storage::{StoredUser, UserStatus},
};

async fn hash(state: &AppState, password: &str) -> Result<String, ApiError> {
    hash_password(password, state.bcrypt_cost).await.map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        ApiError::internal("Could not hash password")
    })
}

fn load(state: &AppState, username: &str) -> Result<StoredUser, ApiError> {
    state
        .users
        .get(username)?
        .ok_or_else(|| ApiError::not_found(format!("User {username} not found")))
}

#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 200, body = UserResponse), (status = 401))
)]
pub async fn me(State(state): State<AppState>, Auth(user): Auth) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(load(&state, &user.user_id)?.into()))
}

#[utoipa::path(
    get,
    path = "/v1/users",
    params(GroupQuery),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [UserResponse]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = match query.group {
        Some(group) => state.users.list_by_group(group)?,
        None => state.users.list()?,
    };
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 201, body = UserResponse), (status = 400), (status = 409))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Auth(admin): Auth,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let now = Utc::now();
    let user = StoredUser {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_string(),
        phone: request.phone.trim().to_string(),
        password_hash: Some(hash(&state, &request.password).await?),
        group: request.group.unwrap_or(DEFAULT_GROUP),
        status: request.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    state.users.create(&user)?;

    tracing::info!(user_id = %user.username, by = %admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 200, body = UserResponse), (status = 404))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(load(&state, &username)?.into()))
}

/// Partial update. Deactivating a user revokes its session.
#[utoipa::path(
    put,
    path = "/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    request_body = UpdateUserRequest,
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 200, body = UserResponse), (status = 400), (status = 404), (status = 409))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate().map_err(ApiError::bad_request)?;
    let mut user = load(&state, &username)?;

    if let Some(email) = request.email {
        user.email = email.trim().to_string();
    }
    if let Some(phone) = request.phone {
        user.phone = phone.trim().to_string();
    }
    if let Some(password) = request.password {
        user.password_hash = Some(hash(&state, &password).await?);
    }
    if let Some(group) = request.group {
        user.group = group;
    }
    let deactivated = request.status == Some(UserStatus::Inactive) && user.is_active();
    if let Some(status) = request.status {
        user.status = status;
    }
    user.updated_at = Utc::now();

    state.users.update(&user)?;
    if deactivated {
        state.auth.revoke(&user.username)?;
    }

    Ok(Json(user.into()))
}

/// Delete a user and its session. `?group=` must match when given.
#[utoipa::path(
    delete,
    path = "/v1/users/{username}",
    params(("username" = String, Path, description = "Username"), GroupQuery),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses((status = 204), (status = 404))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Auth(admin): Auth,
    Path(username): Path<String>,
    Query(query): Query<GroupQuery>,
) -> Result<StatusCode, ApiError> {
    let user = load(&state, &username)?;
    if let Some(group) = query.group.filter(|group| *group != user.group) {
        return Err(ApiError::not_found(format!(
            "User {username} not found in group {group}"
        )));
    }

    state.users.delete(&username)?;
    state.auth.logout(&username)?;

    tracing::info!(user_id = %username, by = %admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
