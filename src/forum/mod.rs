//! Forum operations: users, posts and replies.
//!
//! Each operation composes the same pipeline: validate the body, check the
//! caller's ownership where a resource is mutated, call the store, and map the
//! outcome to a [`ForumError`]. Authentication happens before these methods
//! are reached; protected operations receive an already resolved
//! [`Principal`].
//!
//! Flow Overview:
//! 1) Reject empty or non-object bodies with `BadRequest`.
//! 2) Validate fields in a fixed order and report the first failure.
//! 3) For updates and replies, run the ownership/target checks (404 on failure).
//! 4) Persist, logging storage failures and returning a generic 500.

pub mod authorize;
pub mod error;
pub mod posts;
pub mod types;
pub mod users;
pub mod validate;

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::auth::{CredentialCodec, Principal, TokenCodec, Unauthenticated, authenticate};
use crate::store::ForumStore;

pub use error::ForumError;

/// Shared application state handed to every request.
pub struct Forum {
    store: Arc<dyn ForumStore>,
    tokens: TokenCodec,
    credentials: CredentialCodec,
}

impl std::fmt::Debug for Forum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forum")
            .field("tokens", &self.tokens)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Forum {
    #[must_use]
    pub fn new(store: Arc<dyn ForumStore>, tokens: TokenCodec, credentials: CredentialCodec) -> Self {
        Self {
            store,
            tokens,
            credentials,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn ForumStore {
        self.store.as_ref()
    }

    /// Resolve a raw `Authorization` header value to the calling principal.
    ///
    /// # Errors
    /// Returns [`Unauthenticated`] for missing, invalid or expired tokens.
    pub fn authenticate(&self, bearer: Option<&str>) -> Result<Principal, Unauthenticated> {
        authenticate(&self.tokens, bearer)
    }
}

/// Borrow a request body as a non-empty JSON object.
fn object(body: &Value) -> Result<&Map<String, Value>, ForumError> {
    match body {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(ForumError::BadRequest),
    }
}
