use std::sync::Arc;

use axum::{
    Extension,
    body::Body,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::forum::{Forum, ForumError};

/// Authentication gate for protected routes.
///
/// Resolves the raw `Authorization` header to a [`crate::auth::Principal`] and
/// stores it in the request extensions for the handler; otherwise answers 401.
pub async fn require_auth(
    Extension(forum): Extension<Arc<Forum>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ForumError> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = forum.authenticate(bearer)?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
