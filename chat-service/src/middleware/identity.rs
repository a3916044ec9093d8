//! Caller identity extraction.
//!
//! The gateway in front of this service authenticates the user and forwards
//! the verified subject in the `X-User-ID` header. This service reads the
//! header and never validates it.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Header carrying the authenticated subject.
pub const IDENTITY_HEADER: &str = "X-User-ID";

/// Identity used when the gateway forwards no subject.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Caller identity extracted from request headers.
///
/// Never rejects: a missing or unreadable header yields [`UNKNOWN_IDENTITY`],
/// so unauthenticated callers share one history bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_IDENTITY
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.trim().is_empty());

        // Forwarded values are opaque and kept byte for byte.
        let identity = CallerIdentity(user_id.unwrap_or(UNKNOWN_IDENTITY).to_string());
        if identity.is_unknown() {
            tracing::warn!("No caller identity forwarded, using '{}'", UNKNOWN_IDENTITY);
        }

        tracing::Span::current().record("user_id", identity.as_str());

        Ok(identity)
    }
}
