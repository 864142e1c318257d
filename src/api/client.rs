// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client address and user agent of a request.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, Extensions, HeaderMap},
};

use crate::auth::ClientInfo;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
    if let Some(first) = header_str(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(first.to_string());
    }
    if let Some(real) = header_str(headers, X_REAL_IP) {
        return Some(real.to_string());
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    header_str(headers, USER_AGENT.as_str()).map(str::to_string)
}

/// Extractor yielding the caller's [`ClientInfo`]. Never rejects.
pub struct ClientMeta(pub ClientInfo);

impl<S: Send + Sync> FromRequestParts<S> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientMeta(ClientInfo {
            ip: client_ip(&parts.headers, &parts.extensions),
            user_agent: user_agent(&parts.headers),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn forwarded_for_wins_and_takes_first_hop() {
        let h = headers(&[
            (X_FORWARDED_FOR, "203.0.113.7, 10.0.0.1"),
            (X_REAL_IP, "198.51.100.2"),
        ]);
        assert_eq!(client_ip(&h, &Extensions::new()).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn real_ip_then_socket_address() {
        let h = headers(&[(X_REAL_IP, "198.51.100.2")]);
        assert_eq!(client_ip(&h, &Extensions::new()).as_deref(), Some("198.51.100.2"));

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 5555))));
        assert_eq!(client_ip(&HeaderMap::new(), &extensions).as_deref(), Some("192.0.2.1"));
        assert_eq!(client_ip(&HeaderMap::new(), &Extensions::new()), None);
    }

    #[test]
    fn user_agent_is_read_verbatim() {
        let h = headers(&[("user-agent", "curl/8.5.0")]);
        assert_eq!(user_agent(&h).as_deref(), Some("curl/8.5.0"));
        assert_eq!(user_agent(&HeaderMap::new()), None);
    }
}
