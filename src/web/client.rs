// Client identification for rate limiting.
//
// The identifier is the peer IP address from the connection. Behind a
// reverse proxy every request shares the proxy's address, so when
// `trust_forwarded_for` is enabled the first X-Forwarded-For entry wins.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::AppState;

/// Identifier used when neither a peer address nor a trusted header is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// The rate-limit key for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl FromRequestParts<AppState> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.trust_forwarded_for {
            if let Some(forwarded) = first_forwarded_for(&parts.headers) {
                return Ok(ClientId(forwarded));
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientId(peer.unwrap_or_else(|| UNKNOWN_CLIENT.to_string())))
    }
}

/// First non-empty entry of the X-Forwarded-For header, if any.
fn first_forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|entry| !entry.is_empty())
        .map(str::to_string)
}
