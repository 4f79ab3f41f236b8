//! Client identity extraction.
//!
//! # Responsibilities
//! - Derive (address, user agent) for every request
//! - Attach it to request extensions for the rate limiter and audit log
//!
//! # Design Decisions
//! - Identity is best-effort and spoofable; it keys throttling, not auth
//! - Forwarded headers are ignored unless explicitly trusted
//! - A missing User-Agent is an empty string, not an error

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Rate-limit bucket key: client address plus declared user agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity {
    pub ip: IpAddr,
    pub user_agent: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            user_agent: String::new(),
        }
    }
}

/// Where the client address is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// The TCP peer address.
    Peer,
    /// `X-Real-IP`, then the first `X-Forwarded-For` entry, then the peer.
    Forwarded,
}

impl AddressSource {
    pub fn from_trust(trust_forwarded_headers: bool) -> Self {
        if trust_forwarded_headers {
            Self::Forwarded
        } else {
            Self::Peer
        }
    }
}

impl ClientIdentity {
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, source: AddressSource) -> Self {
        let forwarded = match source {
            AddressSource::Forwarded => forwarded_ip(headers),
            AddressSource::Peer => None,
        };
        let ip = forwarded
            .or_else(|| peer.map(|addr| addr.ip()))
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self { ip, user_agent }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(ip) = header_str(X_REAL_IP).and_then(|v| v.trim().parse().ok()) {
        return Some(ip);
    }
    header_str(X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
}

/// Middleware attaching [`ClientIdentity`] to the request.
pub async fn identify_client(
    State(source): State<AddressSource>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = ClientIdentity::resolve(request.headers(), peer, source);
    request.extensions_mut().insert(identity);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:41000".parse().unwrap())
    }

    #[test]
    fn test_peer_address_and_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.4"));

        let id = ClientIdentity::resolve(&headers, peer(), AddressSource::Peer);
        assert_eq!(id.ip.to_string(), "192.0.2.10");
        assert_eq!(id.user_agent, "curl/8.4");
    }

    #[test]
    fn test_missing_agent_is_empty() {
        let id = ClientIdentity::resolve(&HeaderMap::new(), peer(), AddressSource::Peer);
        assert_eq!(id.user_agent, "");
    }

    #[test]
    fn test_forwarded_headers_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.5"));

        let id = ClientIdentity::resolve(&headers, peer(), AddressSource::Peer);
        assert_eq!(id.ip.to_string(), "192.0.2.10");
    }

    #[test]
    fn test_trusted_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        let id = ClientIdentity::resolve(&headers, peer(), AddressSource::Forwarded);
        assert_eq!(id.ip.to_string(), "203.0.113.5");

        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.7"));
        let id = ClientIdentity::resolve(&headers, peer(), AddressSource::Forwarded);
        assert_eq!(id.ip.to_string(), "198.51.100.7");
    }

    #[test]
    fn test_garbage_forwarded_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("not-an-ip"));
        let id = ClientIdentity::resolve(&headers, peer(), AddressSource::Forwarded);
        assert_eq!(id.ip.to_string(), "192.0.2.10");
    }
}
