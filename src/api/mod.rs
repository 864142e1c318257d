// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info_span, Span};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    analytics::{MonthlyRegistrations, UserAnalytics},
    auth::middleware::require_auth,
    models::{
        ActivityListResponse, CreateUserRequest, LoginRequest, LoginResponse,
        OutletListResponse, OutletRequest, RefreshRequest, RefreshResponse, RegisterRequest,
        UpdateUserRequest, UserResponse,
    },
    state::AppState,
    storage::{ActivityEvent, OutletStats, OutletStatus, StoredOutlet, UserStatus},
};

pub mod activity;
pub mod analytics;
pub mod auth;
pub mod client;
pub mod health;
pub mod outlets;
pub mod users;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/users/me", get(users::me))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{username}",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/outlets",
            get(outlets::list_outlets).post(outlets::create_outlet),
        )
        .route("/outlets/stats", get(outlets::outlet_stats))
        .route(
            "/outlets/{outlet_id}",
            get(outlets::get_outlet)
                .put(outlets::update_outlet)
                .patch(outlets::update_outlet)
                .delete(outlets::delete_outlet),
        )
        .route("/analytics/users", get(analytics::user_analytics))
        .route("/activity", get(activity::list_activity))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let v1_routes = public
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            activity::record_activity,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        auth::refresh,
        auth::logout,
        users::me,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        outlets::list_outlets,
        outlets::outlet_stats,
        outlets::create_outlet,
        outlets::get_outlet,
        outlets::update_outlet,
        outlets::delete_outlet,
        analytics::user_analytics,
        activity::list_activity
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            RefreshResponse,
            UserResponse,
            UserStatus,
            CreateUserRequest,
            UpdateUserRequest,
            OutletRequest,
            OutletListResponse,
            StoredOutlet,
            OutletStatus,
            OutletStats,
            UserAnalytics,
            MonthlyRegistrations,
            ActivityEvent,
            ActivityListResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Registration, login, refresh and logout"),
        (name = "Users", description = "User administration"),
        (name = "Outlets", description = "Outlet administration"),
        (name = "Analytics", description = "Registration report"),
        (name = "Activity", description = "Request activity log")
    )
)]
struct ApiDoc;
