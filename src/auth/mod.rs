//! Credentials, bearer tokens and the authentication gate.
//!
//! Passwords are turned into opaque credentials with [`CredentialCodec`]
//! before they reach storage. Login hands out a signed bearer token from
//! [`TokenCodec`], and every protected request goes through
//! [`gate::authenticate`] to recover the [`Principal`] it was issued to.

pub mod credential;
pub mod gate;
pub mod token;

pub use credential::{CredentialCodec, CredentialError};
pub use gate::{Unauthenticated, authenticate};
pub use token::{Claims, TokenCodec, TokenError};

/// Authenticated user context derived from a bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub nickname: String,
}
