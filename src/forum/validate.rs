//! Field validators for request bodies and listing parameters.
//!
//! Each validator inspects the raw JSON object in a fixed field order and
//! reports the first failing field, so clients get a deterministic error for
//! payloads that are wrong in several places. On success the payload comes
//! back as a typed request with defaults already applied.

use regex::Regex;
use serde_json::{Map, Value};

use crate::store::{PostOrder, PostQuery};

pub const USERNAME_MIN: usize = 5;
pub const USERNAME_MAX: usize = 12;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const PASSWORD_SPECIALS: &[char] = &['-', '_', '*', '^'];

/// Name of the first field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid field: {0}")]
pub struct InvalidField(pub &'static str);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub mobile: String,
    pub url: String,
    /// Zero when the client omitted it.
    pub magic_number: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyInput {
    pub content: String,
    /// `None` when the reply answers the post directly (absent or `0`).
    pub reply_id: Option<i64>,
}

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub user_id: Option<String>,
    pub order_by_reply: Option<String>,
}

fn required_str<'a>(body: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, InvalidField> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or(InvalidField(field))
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

#[must_use]
pub fn valid_username(username: &str) -> bool {
    (USERNAME_MIN..=USERNAME_MAX).contains(&username.len())
        && matches(r"^[A-Za-z]+[0-9_-]+$", username)
}

/// 8 to 15 characters from letters, digits and `-_*^`, with at least one of
/// each class present.
#[must_use]
pub fn valid_password(password: &str) -> bool {
    matches(r"^[A-Za-z\d\-_*^]{8,15}$", password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(&c))
}

#[must_use]
pub fn valid_mobile(mobile: &str) -> bool {
    matches(r"^\+\d{2}\.\d{12}$", mobile)
}

#[must_use]
pub fn valid_url(url: &str) -> bool {
    matches(
        r"^(http://|https://)[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*(\.[a-zA-Z]{2,})$",
        url,
    )
}

/// Validate a registration body.
///
/// Fields are checked in the order username, password, nickname, mobile, url,
/// `magic_number`.
///
/// # Errors
/// Returns the first failing field.
pub fn register(body: &Map<String, Value>) -> Result<RegisterInput, InvalidField> {
    let username = required_str(body, "username")?;
    if !valid_username(username) {
        return Err(InvalidField("username"));
    }

    let password = required_str(body, "password")?;
    if !valid_password(password) {
        return Err(InvalidField("password"));
    }

    let nickname = required_str(body, "nickname")?;

    let mobile = required_str(body, "mobile")?;
    if !valid_mobile(mobile) {
        return Err(InvalidField("mobile"));
    }

    let url = required_str(body, "url")?;
    if !valid_url(url) {
        return Err(InvalidField("url"));
    }

    let magic_number = match body.get("magic_number") {
        None => 0,
        Some(value) => value
            .as_i64()
            .filter(|n| *n >= 0)
            .ok_or(InvalidField("magic_number"))?,
    };

    Ok(RegisterInput {
        username: username.to_string(),
        password: password.to_string(),
        nickname: nickname.to_string(),
        mobile: mobile.to_string(),
        url: url.to_string(),
        magic_number,
    })
}

/// Validate a login body. Only presence and type are checked.
///
/// # Errors
/// Returns the first missing field.
pub fn login(body: &Map<String, Value>) -> Result<LoginInput, InvalidField> {
    let username = required_str(body, "username")?;
    let password = required_str(body, "password")?;
    Ok(LoginInput {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Validate a post body.
///
/// # Errors
/// Returns the first failing field.
pub fn post(body: &Map<String, Value>) -> Result<PostInput, InvalidField> {
    let title = required_str(body, "title")?;
    let content = required_str(body, "content")?;
    Ok(PostInput {
        title: title.to_string(),
        content: content.to_string(),
    })
}

/// Validate a reply body. Whether `replyId` points at a reply of the same
/// post is decided later against storage.
///
/// # Errors
/// Returns the first failing field.
pub fn reply(body: &Map<String, Value>) -> Result<ReplyInput, InvalidField> {
    let content = required_str(body, "content")?;
    let reply_id = match body.get("replyId") {
        None => None,
        Some(value) => match value.as_i64() {
            Some(0) => None,
            Some(id) if id > 0 => Some(id),
            _ => return Err(InvalidField("replyId")),
        },
    };
    Ok(ReplyInput {
        content: content.to_string(),
        reply_id,
    })
}

fn positive(raw: Option<&str>, field: &'static str, default: u32) -> Result<u32, InvalidField> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(InvalidField(field)),
    }
}

/// Parse listing parameters, applying defaults page=1, size=10, userId=0
/// (all users) and orderByReply=false (most recently updated first).
///
/// # Errors
/// Returns the first parameter that does not parse.
pub fn list_params(params: &ListParams) -> Result<PostQuery, InvalidField> {
    let page = positive(params.page.as_deref(), "page", DEFAULT_PAGE)?;
    let size = positive(params.size.as_deref(), "size", DEFAULT_PAGE_SIZE)?.min(MAX_PAGE_SIZE);

    let user_id = match params.user_id.as_deref().map(str::trim) {
        None => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(0) => None,
            Ok(id) if id > 0 => Some(id),
            _ => return Err(InvalidField("userId")),
        },
    };

    let order = match params.order_by_reply.as_deref().map(str::trim) {
        None | Some("false" | "0") => PostOrder::Updated,
        Some("true" | "1") => PostOrder::LastReplied,
        Some(_) => return Err(InvalidField("orderByReply")),
    };

    Ok(PostQuery {
        user_id,
        order,
        page,
        size,
    })
}
