//! Client identification from HTTP request metadata.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::domain::click_event::UNKNOWN;
use crate::state::AppState;

/// Who sent a request, as far as it can be told.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Builds client info from headers and the peer socket address.
    ///
    /// When `behind_proxy` is set, the first `X-Forwarded-For` hop and then
    /// `X-Real-IP` take precedence over the peer address. Enable it only when
    /// a trusted reverse proxy sets these headers; otherwise clients could
    /// pick their own rate limit key.
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Self {
        let forwarded = if behind_proxy {
            forwarded_ip(headers)
        } else {
            None
        };

        let ip = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()));

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self { ip, user_agent }
    }

    /// The client address, or `"unknown"`.
    pub fn ip_or_unknown(&self) -> &str {
        self.ip.as_deref().unwrap_or(UNKNOWN)
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    first_hop.or_else(real_ip).map(str::to_string)
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::from_headers(&parts.headers, peer, state.behind_proxy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:51000".parse().unwrap())
    }

    #[test]
    fn test_peer_address_used_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));

        let info = ClientInfo::from_headers(&headers, peer(), false);

        assert_eq!(info.ip.as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_forwarded_for_first_hop_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));

        let info = ClientInfo::from_headers(&headers, peer(), true);

        assert_eq!(info.ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));

        let info = ClientInfo::from_headers(&headers, peer(), true);

        assert_eq!(info.ip.as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn test_proxy_without_headers_uses_peer() {
        let info = ClientInfo::from_headers(&HeaderMap::new(), peer(), true);

        assert_eq!(info.ip.as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_unknown_without_any_source() {
        let info = ClientInfo::from_headers(&HeaderMap::new(), None, false);

        assert_eq!(info.ip, None);
        assert_eq!(info.ip_or_unknown(), "unknown");
        assert_eq!(info.user_agent, None);
    }

    #[test]
    fn test_user_agent_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.5.0"));

        let info = ClientInfo::from_headers(&headers, None, false);

        assert_eq!(info.user_agent.as_deref(), Some("curl/8.5.0"));
    }

    #[test]
    fn test_ipv6_peer() {
        let peer = Some("[::1]:8080".parse().unwrap());
        let info = ClientInfo::from_headers(&HeaderMap::new(), peer, false);

        assert_eq!(info.ip.as_deref(), Some("::1"));
    }
}
