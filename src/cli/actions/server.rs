use crate::{api, cli::telemetry};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use std::{fmt::Write, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub password_pepper: SecretString,
    pub frontend_url: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let config = api::ServerConfig {
        port: args.port,
        dsn: args.dsn,
        jwt_secret: args.jwt_secret,
        token_ttl: Duration::from_secs(args.token_ttl_seconds),
        password_pepper: args.password_pepper,
        frontend_url: args.frontend_url,
    };

    let result = api::new(config).await;
    telemetry::shutdown_tracer();
    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "store",
            args.dsn.as_ref().map_or_else(
                || "memory".to_string(),
                |dsn| redact_dsn(dsn.expose_secret()),
            ),
        ),
        ("token_ttl_seconds", args.token_ttl_seconds.to_string()),
        (
            "frontend_url",
            args.frontend_url
                .clone()
                .unwrap_or_else(|| "none".to_string()),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ = write!(message, "\n  {key}:{padding} {value}");
    }
    info!("{message}");
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_dsn_hides_password() {
        assert_eq!(
            redact_dsn("postgres://forum:hunter2@db:5432/forum"),
            "postgres://forum:REDACTED@db:5432/forum"
        );
        assert_eq!(
            redact_dsn("postgres://db:5432/forum"),
            "postgres://db:5432/forum"
        );
        assert_eq!(redact_dsn("::not a url"), "invalid-dsn");
    }

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit("abc"), "abc");
    }
}
