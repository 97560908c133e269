//! Authentication gate for protected endpoints.

use tracing::debug;

use super::{Principal, TokenCodec};

/// Rejection for requests without a usable bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("User must be authorized.")]
pub struct Unauthenticated;

/// Resolve the raw `Authorization` header value into a principal.
///
/// The token is expected as the bare header value; a leading `Bearer ` is
/// tolerated. Missing, empty, invalid or expired tokens are rejected.
///
/// # Errors
/// Returns [`Unauthenticated`] when no valid token is presented.
pub fn authenticate(tokens: &TokenCodec, bearer: Option<&str>) -> Result<Principal, Unauthenticated> {
    let raw = bearer.map(str::trim).unwrap_or_default();
    let token = raw.strip_prefix("Bearer ").map_or(raw, str::trim);
    if token.is_empty() {
        return Err(Unauthenticated);
    }

    match tokens.verify(token) {
        Ok(claims) => Ok(Principal {
            user_id: claims.user_id,
            nickname: claims.nickname,
        }),
        Err(err) => {
            debug!("Rejected bearer token: {err}");
            Err(Unauthenticated)
        }
    }
}
