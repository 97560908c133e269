use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::auth::token::DEFAULT_TOKEN_TTL_SECONDS;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL: &str = "token-ttl";
pub const ARG_PASSWORD_PEPPER: &str = "password-pepper";

const DEFAULT_TOKEN_TTL: &str = "86400";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("HMAC key used to sign bearer tokens")
                .env("FORUM_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL)
                .long(ARG_TOKEN_TTL)
                .help("Bearer token lifetime in seconds")
                .env("FORUM_TOKEN_TTL")
                .default_value(DEFAULT_TOKEN_TTL)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_PEPPER)
                .long(ARG_PASSWORD_PEPPER)
                .help("Deployment secret mixed into stored password credentials")
                .long_help(
                    "Deployment secret mixed into stored password credentials. Changing it invalidates every stored password.",
                )
                .env("FORUM_PASSWORD_PEPPER")
                .hide_env_values(true)
                .required(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub password_pepper: SecretString,
}

impl Options {
    /// # Errors
    /// Returns an error if a required secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;
        let password_pepper = matches
            .get_one::<String>(ARG_PASSWORD_PEPPER)
            .cloned()
            .context("missing required argument: --password-pepper")?;
        let token_ttl_seconds = matches
            .get_one::<u64>(ARG_TOKEN_TTL)
            .copied()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_seconds,
            password_pepper: SecretString::from(password_pepper),
        })
    }
}
