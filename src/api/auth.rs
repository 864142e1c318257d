// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use super::client::ClientMeta;
use crate::{
    auth::{password::hash_password, Auth, AuthError},
    error::ApiError,
    models::{
        LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
        UserResponse, DEFAULT_GROUP,
    },
    state::AppState,
    storage::{StoredUser, UserStatus},
};

const TOKEN_TYPE: &str = "Bearer";

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let password_hash = hash_password(&request.password, state.bcrypt_cost)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::internal("Could not register user")
        })?;

    let now = Utc::now();
    let user = StoredUser {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_string(),
        phone: request.phone.trim().to_string(),
        password_hash: Some(password_hash),
        group: DEFAULT_GROUP,
        status: UserStatus::Active,
        created_at: now,
        updated_at: now,
    };
    state.users.create(&user)?;

    tracing::info!(user_id = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled"),
        (status = 503, description = "Directory unavailable")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let outcome = state
        .auth
        .login(
            request.identifier.trim(),
            &request.password,
            request.remember_me,
            client,
        )
        .await?;

    Ok(Json(LoginResponse {
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_at: outcome.access_expires_at,
        refresh_expires_at: outcome.refresh_expires_at,
        user_id: outcome.user_id,
        group: outcome.group,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, body = RefreshResponse),
        (status = 401, description = "Unknown, invalidated or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let outcome = state
        .auth
        .refresh_access(&request.user_id, &request.refresh_token)?;

    Ok(Json(RefreshResponse {
        access_token: outcome.access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_at: outcome.access_expires_at,
        refresh_expires_at: outcome.refresh_expires_at,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses((status = 204), (status = 401, description = "Not authenticated"))
)]
pub async fn logout(State(state): State<AppState>, Auth(user): Auth) -> Result<StatusCode, AuthError> {
    state.auth.logout(&user.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ClientInfo;
    use crate::state::test_support::{seed_user, test_state};

    fn registration(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            phone: "0123456789".into(),
            password: "password123".into(),
            confirm_password: "password123".into(),
            agree_terms: true,
        }
    }

    #[tokio::test]
    async fn register_hashes_password_and_defaults_group() {
        let (state, _dir) = test_state();
        let (status, Json(user)) = register(
            State(state.clone()),
            Json(registration("alice", "alice@example.com")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.group, DEFAULT_GROUP);
        let stored = state.users.get("alice").unwrap().unwrap();
        let hash = stored.password_hash.unwrap();
        assert!(hash.starts_with("$2"));
        assert_ne!(hash, "password123");
    }

    #[tokio::test]
    async fn register_duplicate_is_conflict_and_invalid_is_bad_request() {
        let (state, _dir) = test_state();
        register(State(state.clone()), Json(registration("alice", "alice@example.com")))
            .await
            .unwrap();

        let dup = register(State(state.clone()), Json(registration("alice", "a2@example.com")))
            .await
            .unwrap_err();
        assert_eq!(dup.status, StatusCode::CONFLICT);

        let mut bad = registration("bob", "bob@example.com");
        bad.agree_terms = false;
        let err = register(State(state), Json(bad)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_refresh_logout_round() {
        let (state, _dir) = test_state();
        seed_user(&state, "alice", "password123").await;

        let Json(login_response) = login(
            State(state.clone()),
            ClientMeta(ClientInfo::default()),
            Json(LoginRequest {
                identifier: "alice@example.com".into(),
                password: "password123".into(),
                remember_me: false,
            }),
        )
        .await
        .unwrap();
        assert_eq!(login_response.user_id, "alice");
        assert_eq!(login_response.token_type, "Bearer");

        let Json(refreshed) = refresh(
            State(state.clone()),
            Json(RefreshRequest {
                user_id: "alice".into(),
                refresh_token: login_response.refresh_token.clone(),
            }),
        )
        .await
        .unwrap();
        assert_ne!(refreshed.access_token, login_response.access_token);

        let user = state.auth.authenticate(&refreshed.access_token).unwrap();
        let status = logout(State(state.clone()), Auth(user)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(matches!(
            state.auth.authenticate(&refreshed.access_token),
            Err(AuthError::NoSession)
        ));
    }
}
