// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to the protected router subtree:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/v1/users/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::bearer_token;
use crate::state::AppState;

/// Reject requests without a current access token.
///
/// On success the [`AuthenticatedUser`](super::AuthenticatedUser) is stored
/// in the request extensions for handlers, and copied onto the response
/// extensions for outer layers such as the activity logger.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = match bearer_token(request.headers()).and_then(|token| state.auth.authenticate(token)) {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(code = e.error_code(), path = %request.uri().path(), "Request rejected");
            return e.into_response();
        }
    };

    request.extensions_mut().insert(user.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    response
}
