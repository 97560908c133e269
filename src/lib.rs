//! # Forum
//!
//! `forum` is a small discussion board served over HTTP. Users register and
//! log in to receive a signed bearer token, then create posts, reply to posts
//! or to other replies, and edit what they own.
//!
//! ## Request pipeline
//!
//! Every mutating request runs through the same three stages, in order:
//!
//! 1. **Authentication:** the `Authorization` header must carry a token issued
//!    by `PATCH /api/v1/login`. Protected routes reject missing or invalid
//!    tokens with `401` before the body is looked at.
//! 2. **Validation:** the JSON body is checked field by field and the first
//!    offending field is reported as `Invalid arguments: <field>`.
//! 3. **Authorization:** edits are only allowed on posts and replies the
//!    caller owns. Anything else answers `404 Not Found`, so foreign ids are
//!    indistinguishable from missing ones.
//!
//! ## Storage
//!
//! With a DSN the server talks to `PostgreSQL` (schema in `sql/schema.sql`).
//! Without one it keeps everything in memory, which is what the tests use.
//!
//! Creating a reply also stamps the parent post with the replier and the
//! reply time, so listings ordered by last reply surface active threads.

pub mod api;
pub mod auth;
pub mod cli;
pub mod forum;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
