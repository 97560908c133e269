//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_FRONTEND_URL, ARG_PORT, auth};
use anyhow::Result;
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .filter(|dsn| !dsn.trim().is_empty())
        .cloned()
        .map(SecretString::from);
    let frontend_url = matches
        .get_one::<String>(ARG_FRONTEND_URL)
        .filter(|url| !url.trim().is_empty())
        .cloned();

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        password_pepper: auth_opts.password_pepper,
        frontend_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("FORUM_PORT", Some("9000")),
                ("FORUM_DSN", Some("postgres://forum@localhost:5432/forum")),
                ("FORUM_JWT_SECRET", Some("secret")),
                ("FORUM_PASSWORD_PEPPER", Some("pepper")),
                ("FORUM_TOKEN_TTL", None),
                ("FORUM_FRONTEND_URL", Some("https://forum.dev")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["forum"]);
                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.port, 9000);
                assert_eq!(
                    args.dsn.as_ref().map(|dsn| dsn.expose_secret().to_string()),
                    Some("postgres://forum@localhost:5432/forum".to_string())
                );
                assert_eq!(args.token_ttl_seconds, 86400);
                assert_eq!(args.frontend_url.as_deref(), Some("https://forum.dev"));
                Ok(())
            },
        )
    }

    #[test]
    fn empty_dsn_means_memory_store() -> Result<()> {
        temp_env::with_vars(
            [
                ("FORUM_DSN", Some("")),
                ("FORUM_JWT_SECRET", Some("secret")),
                ("FORUM_PASSWORD_PEPPER", Some("pepper")),
                ("FORUM_FRONTEND_URL", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["forum"]);
                let Action::Server(args) = handler(&matches)?;
                assert!(args.dsn.is_none());
                assert!(args.frontend_url.is_none());
                Ok(())
            },
        )
    }
}
